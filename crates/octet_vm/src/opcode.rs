//! Opcode formats.
//!
//! A format is a four character pattern, one character per nibble of the
//! opcode, most significant first:
//! - `0`-`9`, `A`-`F`: the nibble must have exactly this value
//! - `X`, `Y`: a register index
//! - `N`: part of a constant; a run of `N`s forms one constant (`NNN` is an
//!   address, `NN` a byte, `N` a nibble)
//!
//! Formats are case-insensitive.

use std::fmt;

use crate::error::{Result, VmError};

/// An operand extracted from an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeUnit {
    Register(u8),
    Constant(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Fixed(u8),
    Register,
    Constant,
}

/// A validated opcode format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpcodeFormat {
    text: String,
    slots: [Slot; 4],
}

/// Split an opcode into its four nibbles.
#[inline]
pub fn nibbles(opcode: [u8; 2]) -> [u8; 4] {
    [
        (opcode[0] & 0xF0) >> 4,
        opcode[0] & 0x0F,
        (opcode[1] & 0xF0) >> 4,
        opcode[1] & 0x0F,
    ]
}

impl OpcodeFormat {
    pub fn parse(format: &str) -> Result<Self> {
        let malformed = |reason: String| VmError::MalformedFormat {
            format: format.to_string(),
            reason,
        };

        let chars: Vec<char> = format.chars().collect();
        if chars.len() != 4 {
            return Err(malformed(format!(
                "expected 4 characters, got {}",
                chars.len()
            )));
        }

        let mut slots = [Slot::Constant; 4];
        for (slot, c) in slots.iter_mut().zip(chars) {
            *slot = match c.to_ascii_uppercase() {
                'X' | 'Y' => Slot::Register,
                'N' => Slot::Constant,
                digit => match digit.to_digit(16) {
                    Some(value) => Slot::Fixed(value as u8),
                    None => return Err(malformed(format!("unexpected symbol {:?}", c))),
                },
            };
        }

        Ok(Self {
            text: format.to_ascii_uppercase(),
            slots,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Whether every fixed nibble of the format matches `opcode`.
    pub fn matches(&self, opcode: [u8; 2]) -> bool {
        self.slots
            .iter()
            .zip(nibbles(opcode))
            .all(|(slot, nibble)| match *slot {
                Slot::Fixed(value) => value == nibble,
                Slot::Register | Slot::Constant => true,
            })
    }

    /// Extract the operands of `opcode` in left-to-right order.
    pub fn operands(&self, opcode: [u8; 2]) -> Result<Vec<OpcodeUnit>> {
        if !self.matches(opcode) {
            return Err(VmError::FormatMismatch {
                opcode,
                format: self.text.clone(),
            });
        }

        let nibbles = nibbles(opcode);
        let mut units = Vec::with_capacity(3);
        let mut i = 0;
        while i < 4 {
            match self.slots[i] {
                Slot::Fixed(_) => i += 1,
                Slot::Register => {
                    units.push(OpcodeUnit::Register(nibbles[i]));
                    i += 1;
                }
                Slot::Constant => {
                    let mut value = 0u16;
                    while i < 4 && self.slots[i] == Slot::Constant {
                        value = (value << 4) | nibbles[i] as u16;
                        i += 1;
                    }
                    units.push(OpcodeUnit::Constant(value));
                }
            }
        }
        Ok(units)
    }
}

impl fmt::Display for OpcodeFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Check `opcode` against a format string.
pub fn is_valid(opcode: [u8; 2], format: &str) -> Result<bool> {
    Ok(OpcodeFormat::parse(format)?.matches(opcode))
}

/// Parse `opcode` by a format string into its operands.
pub fn parse(opcode: [u8; 2], format: &str) -> Result<Vec<OpcodeUnit>> {
    OpcodeFormat::parse(format)?.operands(opcode)
}
