pub mod app;
pub mod config;
pub mod decoder;
pub mod error;
pub mod instruction;
pub mod keyboard;
pub mod machine;
pub mod opcode;
pub mod screen;
pub mod stack;
pub mod timer;

pub use app::{AppConfig, Beeper, EmulatorApp, LogBeeper};
pub use config::{BcdEncoding, MachineConfig, ShiftSource};
pub use decoder::Decoder;
pub use error::{Result, VmError};
pub use instruction::{Instruction, Operands, INSTRUCTION_SET};
pub use machine::{Machine, MachineState};
pub use opcode::{OpcodeFormat, OpcodeUnit};

pub const SCREEN_WIDTH: usize = 64;
pub const SCREEN_HEIGHT: usize = 32;
pub const SCREEN_SCALE: u32 = 12;

pub const DEFAULT_MEMORY_SIZE: usize = 4096;
/// Where programs are loaded and where `PC` starts.
pub const START_ADDRESS: u16 = 0x200;
pub const NUM_REGS: usize = 16;
pub const NUM_KEYS: usize = 16;
/// Index of the flag register `VF`.
pub const FLAG_REG: usize = 0xF;

/// Bytes per built-in hex digit sprite.
pub const FONT_CHAR_SIZE: usize = 5;
pub const FONTSET_SIZE: usize = 80;
pub const FONTSET: [u8; FONTSET_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];

/// Base address of the sprite for hex `digit`; only the low nibble is used.
#[inline]
pub const fn font_address(digit: u8) -> u16 {
    (digit & 0x0F) as u16 * FONT_CHAR_SIZE as u16
}
