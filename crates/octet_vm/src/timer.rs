use crate::error::{Result, VmError};

/// An 8-bit countdown that stops at zero.
///
/// Nothing here runs on a clock; the host calls `decrement` at 60 Hz.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Timer {
    count: u8,
}

impl Timer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, value: u32) -> Result<()> {
        self.count = u8::try_from(value).map_err(|_| VmError::TimerOutOfRange { value })?;
        Ok(())
    }

    pub fn get(&self) -> u8 {
        self.count
    }

    pub fn decrement(&mut self) {
        self.count = self.count.saturating_sub(1);
    }

    pub fn is_active(&self) -> bool {
        self.count != 0
    }
}
