use typed_builder::TypedBuilder;

use crate::error::{Result, VmError};
use crate::{DEFAULT_MEMORY_SIZE, FONTSET_SIZE, START_ADDRESS};

/// What `FX33` writes for each decimal digit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BcdEncoding {
    /// The font sprite address of the digit (`digit * 5`).
    #[default]
    FontAddress,
    /// The raw digit value, as on the COSMAC VIP.
    RawDigits,
}

/// Which register the shift instructions `8XY6`/`8XYE` read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShiftSource {
    /// Shift `Vx` in place.
    #[default]
    Vx,
    /// Read `Vy`, write the shifted value to `Vx`.
    Vy,
}

/// Construction-time machine configuration.
///
/// `compatibility_load_store` makes `FX55`/`FX65` advance `I` past the
/// registers they touch.
#[derive(Debug, Clone, PartialEq, Eq, TypedBuilder)]
pub struct MachineConfig {
    #[builder(default = DEFAULT_MEMORY_SIZE)]
    pub memory_size: usize,
    #[builder(default = false)]
    pub compatibility_load_store: bool,
    #[builder(default = START_ADDRESS)]
    pub load_address: u16,
    #[builder(default)]
    pub bcd_encoding: BcdEncoding,
    #[builder(default)]
    pub shift_source: ShiftSource,
    /// Fixed seed for `CXNN`; `None` seeds from the OS.
    #[builder(default, setter(strip_option))]
    pub rng_seed: Option<u64>,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl MachineConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        if self.memory_size > 0x10000 {
            return Err(VmError::InvalidConfig(format!(
                "memory size {} exceeds the 16-bit address space",
                self.memory_size
            )));
        }
        if self.memory_size < FONTSET_SIZE {
            return Err(VmError::InvalidConfig(format!(
                "memory size {} cannot hold the {}-byte font table",
                self.memory_size, FONTSET_SIZE
            )));
        }
        if (self.load_address as usize) < FONTSET_SIZE
            || self.load_address as usize >= self.memory_size
        {
            return Err(VmError::InvalidConfig(format!(
                "load address {:#05X} must lie between the font table and the end of memory",
                self.load_address
            )));
        }
        Ok(())
    }
}
