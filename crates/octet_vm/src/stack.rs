use crate::error::{Result, VmError};

/// Return addresses for `2NNN`/`00EE`. Depth is unbounded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    items: Vec<u16>,
}

impl Stack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, addr: u16) {
        self.items.push(addr);
    }

    pub fn pop(&mut self) -> Result<u16> {
        self.items
            .pop()
            .ok_or(VmError::StackUnderflow { op: "pop" })
    }

    pub fn top(&self) -> Result<u16> {
        self.items
            .last()
            .copied()
            .ok_or(VmError::StackUnderflow { op: "top" })
    }

    pub fn size(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Bottom-to-top view, for debugging.
    pub fn items(&self) -> &[u16] {
        &self.items
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
