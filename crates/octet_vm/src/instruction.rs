use std::fmt;

use rand::Rng;

use crate::config::{BcdEncoding, ShiftSource};
use crate::error::{Result, VmError};
use crate::machine::Machine;
use crate::opcode::OpcodeUnit;
use crate::{font_address, FLAG_REG};


/// A decoded instruction with its operands.
///
/// `x`/`y` are register indices, `kk` a byte constant, `n` a nibble
/// constant and `addr` a 12-bit address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Instruction {
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 00CN, extended display
    ScrollDown { n: u8 },
    /// 00FB, extended display
    ScrollRight,
    /// 00FC, extended display
    ScrollLeft,
    /// 00FE, extended display
    LowRes,
    /// 00FF, extended display
    HighRes,
    /// 1NNN
    Jump { addr: u16 },
    /// 2NNN
    Call { addr: u16 },
    /// 3XNN
    SkipEqConst { x: u8, kk: u8 },
    /// 4XNN
    SkipNeConst { x: u8, kk: u8 },
    /// 5XY0
    SkipEqReg { x: u8, y: u8 },
    /// 6XNN
    LoadConst { x: u8, kk: u8 },
    /// 7XNN
    AddConst { x: u8, kk: u8 },
    /// 8XY0
    Copy { x: u8, y: u8 },
    /// 8XY1
    Or { x: u8, y: u8 },
    /// 8XY2
    And { x: u8, y: u8 },
    /// 8XY3
    Xor { x: u8, y: u8 },
    /// 8XY4
    AddReg { x: u8, y: u8 },
    /// 8XY5
    SubReg { x: u8, y: u8 },
    /// 8XY6
    ShiftRight { x: u8, y: u8 },
    /// 8XY7
    SubReverse { x: u8, y: u8 },
    /// 8XYE
    ShiftLeft { x: u8, y: u8 },
    /// 9XY0
    SkipNeReg { x: u8, y: u8 },
    /// ANNN
    LoadI { addr: u16 },
    /// BNNN
    JumpOffset { addr: u16 },
    /// CXNN
    Random { x: u8, kk: u8 },
    /// DXYN
    Draw { x: u8, y: u8, n: u8 },
    /// EX9E
    SkipKeyDown { x: u8 },
    /// EXA1
    SkipKeyUp { x: u8 },
    /// FX07
    GetDelay { x: u8 },
    /// FX0A
    WaitKey { x: u8 },
    /// FX15
    SetDelay { x: u8 },
    /// FX18
    SetSound { x: u8 },
    /// FX1E
    AddI { x: u8 },
    /// FX29
    LoadChar { x: u8 },
    /// FX33
    StoreBcd { x: u8 },
    /// FX55
    StoreRegs { x: u8 },
    /// FX65
    LoadRegs { x: u8 },
}

/// One prototype per instruction, in decode-table order. Operand fields are
/// placeholders filled in by [`Instruction::with_operands`].
pub const INSTRUCTION_SET: &[Instruction] = {
    use Instruction::*;
    &[
        ClearScreen,
        Return,
        ScrollDown { n: 0 },
        ScrollRight,
        ScrollLeft,
        LowRes,
        HighRes,
        Jump { addr: 0 },
        Call { addr: 0 },
        SkipEqConst { x: 0, kk: 0 },
        SkipNeConst { x: 0, kk: 0 },
        SkipEqReg { x: 0, y: 0 },
        LoadConst { x: 0, kk: 0 },
        AddConst { x: 0, kk: 0 },
        Copy { x: 0, y: 0 },
        Or { x: 0, y: 0 },
        And { x: 0, y: 0 },
        Xor { x: 0, y: 0 },
        AddReg { x: 0, y: 0 },
        SubReg { x: 0, y: 0 },
        ShiftRight { x: 0, y: 0 },
        SubReverse { x: 0, y: 0 },
        ShiftLeft { x: 0, y: 0 },
        SkipNeReg { x: 0, y: 0 },
        LoadI { addr: 0 },
        JumpOffset { addr: 0 },
        Random { x: 0, kk: 0 },
        Draw { x: 0, y: 0, n: 0 },
        SkipKeyDown { x: 0 },
        SkipKeyUp { x: 0 },
        GetDelay { x: 0 },
        WaitKey { x: 0 },
        SetDelay { x: 0 },
        SetSound { x: 0 },
        AddI { x: 0 },
        LoadChar { x: 0 },
        StoreBcd { x: 0 },
        StoreRegs { x: 0 },
        LoadRegs { x: 0 },
    ]
};

/// Operands routed out of an opcode: registers in order of appearance and
/// at most one constant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Operands {
    registers: Vec<u8>,
    constant: Option<u16>,
    format: &'static str,
}

impl Operands {
    pub fn route(format: &'static str, units: &[OpcodeUnit]) -> Self {
        let mut operands = Operands {
            format,
            ..Default::default()
        };
        for unit in units {
            match *unit {
                OpcodeUnit::Register(r) => operands.registers.push(r & 0x0F),
                OpcodeUnit::Constant(k) => operands.constant = Some(k),
            }
        }
        operands
    }

    fn register(&self, index: usize) -> Result<u8> {
        self.registers
            .get(index)
            .copied()
            .ok_or(VmError::MissingOperand {
                format: self.format,
            })
    }

    fn x(&self) -> Result<u8> {
        self.register(0)
    }

    fn y(&self) -> Result<u8> {
        self.register(1)
    }

    fn addr(&self) -> Result<u16> {
        self.constant.ok_or(VmError::MissingOperand {
            format: self.format,
        })
    }

    /// Byte and nibble constants never exceed `u8`.
    fn small(&self) -> Result<u8> {
        Ok(self.addr()? as u8)
    }
}

impl Instruction {
    pub fn opcode_format(&self) -> &'static str {
        use Instruction::*;
        match self {
            ClearScreen => "00E0",
            Return => "00EE",
            ScrollDown { .. } => "00CN",
            ScrollRight => "00FB",
            ScrollLeft => "00FC",
            LowRes => "00FE",
            HighRes => "00FF",
            Jump { .. } => "1NNN",
            Call { .. } => "2NNN",
            SkipEqConst { .. } => "3XNN",
            SkipNeConst { .. } => "4XNN",
            SkipEqReg { .. } => "5XY0",
            LoadConst { .. } => "6XNN",
            AddConst { .. } => "7XNN",
            Copy { .. } => "8XY0",
            Or { .. } => "8XY1",
            And { .. } => "8XY2",
            Xor { .. } => "8XY3",
            AddReg { .. } => "8XY4",
            SubReg { .. } => "8XY5",
            ShiftRight { .. } => "8XY6",
            SubReverse { .. } => "8XY7",
            ShiftLeft { .. } => "8XYE",
            SkipNeReg { .. } => "9XY0",
            LoadI { .. } => "ANNN",
            JumpOffset { .. } => "BNNN",
            Random { .. } => "CXNN",
            Draw { .. } => "DXYN",
            SkipKeyDown { .. } => "EX9E",
            SkipKeyUp { .. } => "EXA1",
            GetDelay { .. } => "FX07",
            WaitKey { .. } => "FX0A",
            SetDelay { .. } => "FX15",
            SetSound { .. } => "FX18",
            AddI { .. } => "FX1E",
            LoadChar { .. } => "FX29",
            StoreBcd { .. } => "FX33",
            StoreRegs { .. } => "FX55",
            LoadRegs { .. } => "FX65",
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        use Instruction::*;
        match self {
            ClearScreen => "CLS",
            Return => "RET",
            ScrollDown { .. } => "SCD",
            ScrollRight => "SCR",
            ScrollLeft => "SCL",
            LowRes => "LOW",
            HighRes => "HIGH",
            Jump { .. } | JumpOffset { .. } => "JP",
            Call { .. } => "CALL",
            SkipEqConst { .. } | SkipEqReg { .. } => "SE",
            SkipNeConst { .. } | SkipNeReg { .. } => "SNE",
            LoadConst { .. }
            | Copy { .. }
            | LoadI { .. }
            | GetDelay { .. }
            | WaitKey { .. }
            | SetDelay { .. }
            | SetSound { .. }
            | LoadChar { .. }
            | StoreBcd { .. }
            | StoreRegs { .. }
            | LoadRegs { .. } => "LD",
            AddConst { .. } | AddReg { .. } | AddI { .. } => "ADD",
            Or { .. } => "OR",
            And { .. } => "AND",
            Xor { .. } => "XOR",
            SubReg { .. } => "SUB",
            ShiftRight { .. } => "SHR",
            SubReverse { .. } => "SUBN",
            ShiftLeft { .. } => "SHL",
            Random { .. } => "RND",
            Draw { .. } => "DRW",
            SkipKeyDown { .. } => "SKP",
            SkipKeyUp { .. } => "SKNP",
        }
    }

    /// Jump-style instructions set `PC` themselves; everything else is
    /// advanced by 2 after executing.
    pub fn is_jump(&self) -> bool {
        use Instruction::*;
        matches!(
            self,
            Return
                | Jump { .. }
                | Call { .. }
                | JumpOffset { .. }
                | SkipEqConst { .. }
                | SkipNeConst { .. }
                | SkipEqReg { .. }
                | SkipNeReg { .. }
                | SkipKeyDown { .. }
                | SkipKeyUp { .. }
        )
    }

    /// Part of the extended-display superset that is decoded but not run.
    pub fn is_extended(&self) -> bool {
        use Instruction::*;
        matches!(
            self,
            ScrollDown { .. } | ScrollRight | ScrollLeft | LowRes | HighRes
        )
    }

    /// Build an instruction of the same kind as `self` carrying `operands`.
    pub fn with_operands(self, operands: &Operands) -> Result<Instruction> {
        use Instruction::*;
        let o = operands;
        Ok(match self {
            ClearScreen | Return | ScrollRight | ScrollLeft | LowRes | HighRes => self,
            ScrollDown { .. } => ScrollDown { n: o.small()? },
            Jump { .. } => Jump { addr: o.addr()? },
            Call { .. } => Call { addr: o.addr()? },
            SkipEqConst { .. } => SkipEqConst { x: o.x()?, kk: o.small()? },
            SkipNeConst { .. } => SkipNeConst { x: o.x()?, kk: o.small()? },
            SkipEqReg { .. } => SkipEqReg { x: o.x()?, y: o.y()? },
            LoadConst { .. } => LoadConst { x: o.x()?, kk: o.small()? },
            AddConst { .. } => AddConst { x: o.x()?, kk: o.small()? },
            Copy { .. } => Copy { x: o.x()?, y: o.y()? },
            Or { .. } => Or { x: o.x()?, y: o.y()? },
            And { .. } => And { x: o.x()?, y: o.y()? },
            Xor { .. } => Xor { x: o.x()?, y: o.y()? },
            AddReg { .. } => AddReg { x: o.x()?, y: o.y()? },
            SubReg { .. } => SubReg { x: o.x()?, y: o.y()? },
            ShiftRight { .. } => ShiftRight { x: o.x()?, y: o.y()? },
            SubReverse { .. } => SubReverse { x: o.x()?, y: o.y()? },
            ShiftLeft { .. } => ShiftLeft { x: o.x()?, y: o.y()? },
            SkipNeReg { .. } => SkipNeReg { x: o.x()?, y: o.y()? },
            LoadI { .. } => LoadI { addr: o.addr()? },
            JumpOffset { .. } => JumpOffset { addr: o.addr()? },
            Random { .. } => Random { x: o.x()?, kk: o.small()? },
            Draw { .. } => Draw {
                x: o.x()?,
                y: o.y()?,
                n: o.small()?,
            },
            SkipKeyDown { .. } => SkipKeyDown { x: o.x()? },
            SkipKeyUp { .. } => SkipKeyUp { x: o.x()? },
            GetDelay { .. } => GetDelay { x: o.x()? },
            WaitKey { .. } => WaitKey { x: o.x()? },
            SetDelay { .. } => SetDelay { x: o.x()? },
            SetSound { .. } => SetSound { x: o.x()? },
            AddI { .. } => AddI { x: o.x()? },
            LoadChar { .. } => LoadChar { x: o.x()? },
            StoreBcd { .. } => StoreBcd { x: o.x()? },
            StoreRegs { .. } => StoreRegs { x: o.x()? },
            LoadRegs { .. } => LoadRegs { x: o.x()? },
        })
    }

    /// Apply this instruction to `m`.
    ///
    /// Does not advance `PC` for non-jump instructions; `Machine::step`
    /// does that.
    pub fn execute(&self, m: &mut Machine) -> Result<()> {
        use Instruction::*;
        match *self {
            ClearScreen => m.screen.clear(),
            Return => m.pc = m.stack.pop()?,
            ScrollDown { .. } | ScrollRight | ScrollLeft | LowRes | HighRes => {
                log::warn!("{} at {:#05X} needs the extended display", self, m.pc);
                return Err(VmError::NotImplemented {
                    mnemonic: self.mnemonic(),
                });
            }
            Jump { addr } => m.pc = addr,
            Call { addr } => {
                m.stack.push(m.pc.wrapping_add(2));
                m.pc = addr;
            }
            SkipEqConst { x, kk } => m.skip_if(m.reg(x) == kk),
            SkipNeConst { x, kk } => m.skip_if(m.reg(x) != kk),
            SkipEqReg { x, y } => m.skip_if(m.reg(x) == m.reg(y)),
            SkipNeReg { x, y } => m.skip_if(m.reg(x) != m.reg(y)),
            LoadConst { x, kk } => m.set_reg(x, kk),
            AddConst { x, kk } => m.set_reg(x, m.reg(x).wrapping_add(kk)),
            Copy { x, y } => m.set_reg(x, m.reg(y)),
            Or { x, y } => m.set_reg(x, m.reg(x) | m.reg(y)),
            And { x, y } => m.set_reg(x, m.reg(x) & m.reg(y)),
            Xor { x, y } => m.set_reg(x, m.reg(x) ^ m.reg(y)),
            AddReg { x, y } => {
                let (sum, carry) = m.reg(x).overflowing_add(m.reg(y));
                m.set_reg(x, sum);
                m.v[FLAG_REG] = carry as u8;
            }
            SubReg { x, y } => {
                let (vx, vy) = (m.reg(x), m.reg(y));
                m.set_reg(x, vx.wrapping_sub(vy));
                m.v[FLAG_REG] = (vx >= vy) as u8;
            }
            SubReverse { x, y } => {
                let (vx, vy) = (m.reg(x), m.reg(y));
                m.set_reg(x, vy.wrapping_sub(vx));
                m.v[FLAG_REG] = (vy >= vx) as u8;
            }
            ShiftRight { x, y } => {
                let value = m.shift_operand(x, y);
                m.set_reg(x, value >> 1);
                m.v[FLAG_REG] = value & 0x1;
            }
            ShiftLeft { x, y } => {
                let value = m.shift_operand(x, y);
                m.set_reg(x, value << 1);
                m.v[FLAG_REG] = value >> 7;
            }
            LoadI { addr } => m.i = addr,
            JumpOffset { addr } => m.pc = addr.wrapping_add(m.v[0] as u16),
            Random { x, kk } => {
                let byte: u8 = m.rng.gen();
                m.set_reg(x, byte & kk);
            }
            Draw { x, y, n } => {
                let origin_x = m.reg(x) as usize;
                let origin_y = m.reg(y) as usize;
                let mut collision = false;
                for row in 0..n as usize {
                    let sprite = m.read_byte(m.i as usize + row);
                    for col in 0..8 {
                        let bit = (sprite >> (7 - col)) & 0x1;
                        collision |= m.screen.set_pixel(origin_y + row, origin_x + col, bit)?;
                    }
                }
                m.v[FLAG_REG] = collision as u8;
            }
            SkipKeyDown { x } => m.skip_if(m.keyboard.is_pressed(m.reg(x))),
            SkipKeyUp { x } => m.skip_if(!m.keyboard.is_pressed(m.reg(x))),
            GetDelay { x } => m.set_reg(x, m.delay_timer.get()),
            WaitKey { x } => match m.keyboard.first_pressed() {
                Some(key) => {
                    m.set_reg(x, key);
                    m.blocked = false;
                }
                None => m.blocked = true,
            },
            SetDelay { x } => m.delay_timer.set(m.reg(x) as u32)?,
            SetSound { x } => m.sound_timer.set(m.reg(x) as u32)?,
            AddI { x } => m.i = m.i.wrapping_add(m.reg(x) as u16),
            LoadChar { x } => m.i = font_address(m.reg(x)),
            StoreBcd { x } => {
                let value = m.reg(x);
                let digits = [value / 100, (value / 10) % 10, value % 10];
                let encoding = m.config.bcd_encoding;
                for (offset, digit) in digits.into_iter().enumerate() {
                    let byte = match encoding {
                        BcdEncoding::FontAddress => font_address(digit) as u8,
                        BcdEncoding::RawDigits => digit,
                    };
                    m.write_byte(m.i as usize + offset, byte);
                }
            }
            StoreRegs { x } => {
                for r in 0..=x {
                    m.write_byte(m.i as usize + r as usize, m.reg(r));
                }
                m.advance_i_after_block(x);
            }
            LoadRegs { x } => {
                for r in 0..=x {
                    let byte = m.read_byte(m.i as usize + r as usize);
                    m.set_reg(r, byte);
                }
                m.advance_i_after_block(x);
            }
        }
        Ok(())
    }
}

impl Machine {
    #[inline]
    fn reg(&self, r: u8) -> u8 {
        self.v[r as usize & 0x0F]
    }

    #[inline]
    fn set_reg(&mut self, r: u8, value: u8) {
        self.v[r as usize & 0x0F] = value;
    }

    fn skip_if(&mut self, condition: bool) {
        let offset = if condition { 4 } else { 2 };
        self.pc = self.pc.wrapping_add(offset);
    }

    fn shift_operand(&self, x: u8, y: u8) -> u8 {
        match self.config.shift_source {
            ShiftSource::Vx => self.reg(x),
            ShiftSource::Vy => self.reg(y),
        }
    }

    fn advance_i_after_block(&mut self, x: u8) {
        if self.config.compatibility_load_store {
            self.i = self.i.wrapping_add(x as u16 + 1);
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use Instruction::*;
        let name = self.mnemonic();
        match *self {
            ClearScreen | Return | ScrollRight | ScrollLeft | LowRes | HighRes => {
                write!(f, "{}", name)
            }
            ScrollDown { n } => write!(f, "{} {}", name, n),
            Jump { addr } | Call { addr } => write!(f, "{} {:#05X}", name, addr),
            JumpOffset { addr } => write!(f, "{} V0, {:#05X}", name, addr),
            LoadI { addr } => write!(f, "{} I, {:#05X}", name, addr),
            SkipEqConst { x, kk }
            | SkipNeConst { x, kk }
            | LoadConst { x, kk }
            | AddConst { x, kk }
            | Random { x, kk } => write!(f, "{} V{:X}, {:#04X}", name, x, kk),
            SkipEqReg { x, y }
            | SkipNeReg { x, y }
            | Copy { x, y }
            | Or { x, y }
            | And { x, y }
            | Xor { x, y }
            | AddReg { x, y }
            | SubReg { x, y }
            | ShiftRight { x, y }
            | SubReverse { x, y }
            | ShiftLeft { x, y } => write!(f, "{} V{:X}, V{:X}", name, x, y),
            Draw { x, y, n } => write!(f, "{} V{:X}, V{:X}, {}", name, x, y, n),
            SkipKeyDown { x } | SkipKeyUp { x } => write!(f, "{} V{:X}", name, x),
            GetDelay { x } => write!(f, "{} V{:X}, DT", name, x),
            WaitKey { x } => write!(f, "{} V{:X}, K", name, x),
            SetDelay { x } => write!(f, "{} DT, V{:X}", name, x),
            SetSound { x } => write!(f, "{} ST, V{:X}", name, x),
            AddI { x } => write!(f, "{} I, V{:X}", name, x),
            LoadChar { x } => write!(f, "{} F, V{:X}", name, x),
            StoreBcd { x } => write!(f, "{} B, V{:X}", name, x),
            StoreRegs { x } => write!(f, "{} [I], V{:X}", name, x),
            LoadRegs { x } => write!(f, "{} V{:X}, [I]", name, x),
        }
    }
}
