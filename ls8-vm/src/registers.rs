//! General-purpose register file. R7 doubles as the stack pointer.

use crate::error::{self, Result};
use serde::{Deserialize, Serialize};

/// Number of registers
pub const REGISTER_COUNT: usize = 8;

/// Index of the stack pointer register
pub const SP: u8 = 7;

/// Initial stack pointer value (empty stack)
pub const SP_INIT: u8 = 0xF4;

/// R0-R7
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    values: [u8; REGISTER_COUNT],
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    /// All registers zero except SP, which points at an empty stack
    pub fn new() -> Self {
        let mut values = [0; REGISTER_COUNT];
        values[SP as usize] = SP_INIT;
        Self { values }
    }

    /// Read register `index`
    pub fn get(&self, index: u8) -> Result<u8> {
        self.values
            .get(index as usize)
            .copied()
            .ok_or_else(|| error::invalid_register(index))
    }

    /// Write register `index`
    pub fn set(&mut self, index: u8, value: u8) -> Result<()> {
        let slot = self
            .values
            .get_mut(index as usize)
            .ok_or_else(|| error::invalid_register(index))?;
        *slot = value;
        Ok(())
    }

    /// Current stack pointer
    pub fn sp(&self) -> u8 {
        self.values[SP as usize]
    }

    pub fn set_sp(&mut self, value: u8) {
        self.values[SP as usize] = value;
    }

    pub fn as_array(&self) -> &[u8; REGISTER_COUNT] {
        &self.values
    }
}
