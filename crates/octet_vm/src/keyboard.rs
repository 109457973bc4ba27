use crate::error::{Result, VmError};
use crate::NUM_KEYS;

/// State of the 16-key hex keypad.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    keys: [bool; NUM_KEYS],
}

impl Keyboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: u8) -> Result<()> {
        self.set(key, true)
    }

    pub fn key_up(&mut self, key: u8) -> Result<()> {
        self.set(key, false)
    }

    fn set(&mut self, key: u8, pressed: bool) -> Result<()> {
        let slot = self
            .keys
            .get_mut(key as usize)
            .ok_or(VmError::InvalidKey { key })?;
        *slot = pressed;
        Ok(())
    }

    /// Keys outside the pad are never pressed.
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// The lowest-numbered key currently held.
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|&k| k).map(|k| k as u8)
    }
}
