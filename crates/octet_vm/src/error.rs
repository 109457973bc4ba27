use thiserror::Error;

pub type Result<T> = std::result::Result<T, VmError>;

/// Everything that can go wrong while decoding or executing a program.
///
/// Halting (an exit code being set) is not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VmError {
    // Decode errors.
    #[error("unknown instruction {opcode:02X?}")]
    UnknownOpcode { opcode: [u8; 2] },

    #[error("opcode {opcode:02X?} matches several formats: {formats:?}")]
    AmbiguousOpcode {
        opcode: [u8; 2],
        formats: Vec<&'static str>,
    },

    #[error("malformed opcode format {format:?}: {reason}")]
    MalformedFormat { format: String, reason: String },

    #[error("opcode {opcode:02X?} does not correspond to format {format:?}")]
    FormatMismatch { opcode: [u8; 2], format: String },

    #[error("format {format:?} does not supply the operands its instruction needs")]
    MissingOperand { format: &'static str },

    // State errors.
    #[error("{op} on empty call stack")]
    StackUnderflow { op: &'static str },

    #[error("timer value {value} is outside [0, 255]")]
    TimerOutOfRange { value: u32 },

    #[error("pixel value {value} must be 0 or 1")]
    InvalidPixel { value: u8 },

    #[error("key {key} is outside the 16-key pad")]
    InvalidKey { key: u8 },

    #[error("program of {size} bytes at {origin:#05X} does not fit in {memory_size} bytes of memory")]
    ProgramTooLarge {
        size: usize,
        origin: u16,
        memory_size: usize,
    },

    #[error("invalid machine configuration: {0}")]
    InvalidConfig(String),

    #[error("step() called while an instruction is executing")]
    Reentrant,

    // Recognised but not emulated.
    #[error("instruction {mnemonic} is not implemented")]
    NotImplemented { mnemonic: &'static str },
}

impl VmError {
    /// Whether the error comes from turning bytes into an instruction.
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            VmError::UnknownOpcode { .. }
                | VmError::AmbiguousOpcode { .. }
                | VmError::MalformedFormat { .. }
                | VmError::FormatMismatch { .. }
                | VmError::MissingOperand { .. }
        )
    }
}
