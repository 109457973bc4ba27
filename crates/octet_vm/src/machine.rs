use std::fmt;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::MachineConfig;
use crate::decoder::Decoder;
use crate::error::{Result, VmError};
use crate::instruction::Instruction;
use crate::keyboard::Keyboard;
use crate::screen::Screen;
use crate::stack::Stack;
use crate::timer::Timer;
use crate::{FONTSET, FONTSET_SIZE, NUM_REGS};

#[cfg(test)]
mod tests;

/// Exit code reported when a program halts normally.
pub const EXIT_OK: i32 = 0;

/// The CHIP-8 virtual machine.
///
/// A host drives it by calling [`Machine::step`] at its chosen instruction
/// rate and [`Machine::decrement_timers`] at 60 Hz. The machine never owns
/// a thread or a clock.
pub struct Machine {
    pub(crate) config: MachineConfig,
    pub(crate) memory: Vec<u8>,
    /// V0..VF
    pub(crate) v: [u8; NUM_REGS],
    /// Address register
    pub(crate) i: u16,
    /// Program counter
    pub(crate) pc: u16,
    pub(crate) stack: Stack,
    pub(crate) screen: Screen,
    pub(crate) keyboard: Keyboard,
    pub(crate) delay_timer: Timer,
    pub(crate) sound_timer: Timer,
    /// Waiting on `FX0A` for a key press.
    pub(crate) blocked: bool,
    pub(crate) exit_code: Option<i32>,
    pub(crate) rng: StdRng,
    decoder: Decoder,
    /// Image rewritten into memory on every reset.
    program: Vec<u8>,
    program_origin: u16,
    executing: bool,
}

impl Machine {
    pub fn new(config: MachineConfig) -> Result<Self> {
        config.validate()?;
        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut machine = Self {
            memory: vec![0; config.memory_size],
            v: [0; NUM_REGS],
            i: 0,
            pc: config.load_address,
            stack: Stack::new(),
            screen: Screen::default(),
            keyboard: Keyboard::new(),
            delay_timer: Timer::new(),
            sound_timer: Timer::new(),
            blocked: false,
            exit_code: None,
            rng,
            decoder: Decoder::new()?,
            program: Vec::new(),
            program_origin: config.load_address,
            executing: false,
            config,
        };
        machine.reset();
        Ok(machine)
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    /// Reinitialize all mutable state.
    ///
    /// Memory is zeroed, the font table re-seeded and the last loaded
    /// program copied back to its origin. Keyboard state belongs to the
    /// host and is kept, as is the decode cache.
    pub fn reset(&mut self) {
        self.memory.fill(0);
        self.memory[..FONTSET_SIZE].copy_from_slice(&FONTSET);
        let origin = self.program_origin as usize;
        self.memory[origin..origin + self.program.len()].copy_from_slice(&self.program);

        self.v = [0; NUM_REGS];
        self.i = 0;
        self.pc = self.program_origin;
        self.stack.clear();
        self.screen.clear();
        self.delay_timer = Timer::new();
        self.sound_timer = Timer::new();
        self.blocked = false;
        self.exit_code = None;
        self.executing = false;
        log::debug!(
            "machine reset, {} byte program at {:#05X}",
            self.program.len(),
            origin
        );
    }

    /// Load a program at the configured load address.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        self.load_program_at(program, self.config.load_address)
    }

    /// Reset the machine and load `program` at `origin`, leaving `PC` there.
    pub fn load_program_at(&mut self, program: &[u8], origin: u16) -> Result<()> {
        if origin as usize + program.len() > self.memory.len() {
            return Err(VmError::ProgramTooLarge {
                size: program.len(),
                origin,
                memory_size: self.memory.len(),
            });
        }
        self.program = program.to_vec();
        self.program_origin = origin;
        self.reset();
        log::info!("loaded {} byte program at {:#05X}", program.len(), origin);
        Ok(())
    }

    /// The opcode at `PC`, or `None` if the next two bytes fall outside
    /// memory.
    fn fetch(&self) -> Option<[u8; 2]> {
        let pc = self.pc as usize;
        let hi = *self.memory.get(pc)?;
        let lo = *self.memory.get(pc + 1)?;
        Some([hi, lo])
    }

    fn halt(&mut self, code: i32) {
        log::info!("program halted at {:#05X} with code {}", self.pc, code);
        self.exit_code = Some(code);
    }

    /// Fetch, decode and execute one instruction.
    ///
    /// Halting (sentinel `0000` or `PC` past the end of memory) sets the
    /// exit code; stepping a halted machine does nothing.
    pub fn step(&mut self) -> Result<()> {
        if self.exit_code.is_some() {
            return Ok(());
        }
        if self.executing {
            return Err(VmError::Reentrant);
        }

        let opcode = match self.fetch() {
            Some([0x00, 0x00]) | None => {
                self.halt(EXIT_OK);
                return Ok(());
            }
            Some(opcode) => opcode,
        };

        let instruction = self.decoder.decode(opcode)?;
        log::trace!("{:#05X}: {:02X}{:02X} {}", self.pc, opcode[0], opcode[1], instruction);

        self.executing = true;
        let result = instruction.execute(self);
        self.executing = false;
        result?;

        if !instruction.is_jump() && !self.blocked {
            self.pc = self.pc.wrapping_add(2);
        }
        Ok(())
    }

    /// Decode the instruction at `PC` without running it.
    pub fn peek_instruction(&mut self) -> Result<Option<Instruction>> {
        match self.fetch() {
            Some([0x00, 0x00]) | None => Ok(None),
            Some(opcode) => self.decoder.decode(opcode).map(Some),
        }
    }

    /// Count both timers down one tick.
    ///
    /// Returns whether the sound timer is still running afterwards, i.e.
    /// whether the host should sound its tone for this tick.
    pub fn decrement_timers(&mut self) -> bool {
        self.delay_timer.decrement();
        self.sound_timer.decrement();
        self.sound_timer.is_active()
    }

    #[inline]
    pub(crate) fn read_byte(&self, addr: usize) -> u8 {
        self.memory[addr % self.memory.len()]
    }

    #[inline]
    pub(crate) fn write_byte(&mut self, addr: usize, value: u8) {
        let len = self.memory.len();
        self.memory[addr % len] = value;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn set_pc(&mut self, pc: u16) {
        self.pc = pc;
    }

    pub fn i(&self) -> u16 {
        self.i
    }

    pub fn set_i(&mut self, i: u16) {
        self.i = i;
    }

    /// Register `Vr`; only the low nibble of `r` is used.
    pub fn v(&self, r: u8) -> u8 {
        self.v[r as usize & 0x0F]
    }

    pub fn set_v(&mut self, r: u8, value: u8) {
        self.v[r as usize & 0x0F] = value;
    }

    pub fn registers(&self) -> &[u8; NUM_REGS] {
        &self.v
    }

    pub fn memory(&self) -> &[u8] {
        &self.memory
    }

    pub fn memory_mut(&mut self) -> &mut [u8] {
        &mut self.memory
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    pub fn stack_mut(&mut self) -> &mut Stack {
        &mut self.stack
    }

    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screen
    }

    pub fn keyboard(&self) -> &Keyboard {
        &self.keyboard
    }

    pub fn keyboard_mut(&mut self) -> &mut Keyboard {
        &mut self.keyboard
    }

    pub fn key_down(&mut self, key: u8) -> Result<()> {
        self.keyboard.key_down(key)
    }

    pub fn key_up(&mut self, key: u8) -> Result<()> {
        self.keyboard.key_up(key)
    }

    pub fn delay_timer(&self) -> &Timer {
        &self.delay_timer
    }

    pub fn delay_timer_mut(&mut self) -> &mut Timer {
        &mut self.delay_timer
    }

    pub fn sound_timer(&self) -> &Timer {
        &self.sound_timer
    }

    pub fn sound_timer_mut(&mut self) -> &mut Timer {
        &mut self.sound_timer
    }

    pub fn is_blocked(&self) -> bool {
        self.blocked
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    pub fn snapshot(&self) -> MachineState {
        MachineState {
            v: self.v,
            i: self.i,
            pc: self.pc,
            delay: self.delay_timer.get(),
            sound: self.sound_timer.get(),
            stack: self.stack.items().to_vec(),
            blocked: self.blocked,
            exit_code: self.exit_code,
        }
    }
}

/// Register-level view of a machine, for debuggers and logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineState {
    pub v: [u8; NUM_REGS],
    pub i: u16,
    pub pc: u16,
    pub delay: u8,
    pub sound: u8,
    pub stack: Vec<u16>,
    pub blocked: bool,
    pub exit_code: Option<i32>,
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V: [")?;
        for (idx, value) in self.v.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:02X}", value)?;
        }
        write!(
            f,
            "] PC: {:03X} I: {:03X} DT: {:02X} ST: {:02X} Stack: [",
            self.pc, self.i, self.delay, self.sound
        )?;
        for (idx, addr) in self.stack.iter().enumerate() {
            if idx > 0 {
                write!(f, " ")?;
            }
            write!(f, "{:03X}", addr)?;
        }
        write!(f, "]")?;
        if self.blocked {
            write!(f, " (waiting for key)")?;
        }
        Ok(())
    }
}
