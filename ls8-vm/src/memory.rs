//! # LS-8 Memory
//!
//! 256 byte cells, addressed 0-255. The program image is loaded from
//! address 0 upwards; the stack lives at the top and grows down.

use crate::error::{self, Result};

/// Number of addressable cells
pub const MEMORY_SIZE: usize = 256;

/// Random-access memory of the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ram {
    cells: [u8; MEMORY_SIZE],
}

impl Default for Ram {
    fn default() -> Self {
        Self::new()
    }
}

impl Ram {
    /// Create zeroed memory
    pub fn new() -> Self {
        Self {
            cells: [0; MEMORY_SIZE],
        }
    }

    /// Read the byte at `address` (the MAR), returning it as the MDR
    pub fn read(&self, address: usize) -> Result<u8> {
        self.cells
            .get(address)
            .copied()
            .ok_or_else(|| error::out_of_bounds(address).with_operation("ram::read"))
    }

    /// Write `value` to `address`
    pub fn write(&mut self, address: usize, value: u8) -> Result<()> {
        let cell = self
            .cells
            .get_mut(address)
            .ok_or_else(|| error::out_of_bounds(address).with_operation("ram::write"))?;
        *cell = value;
        Ok(())
    }

    /// Read without faulting; `None` past the end of memory
    pub fn peek(&self, address: usize) -> Option<u8> {
        self.cells.get(address).copied()
    }

    /// Copy a program image into memory starting at address 0
    pub fn load_image(&mut self, image: &[u8]) -> Result<()> {
        if image.len() > MEMORY_SIZE {
            return Err(error::program_too_large(image.len()).with_operation("ram::load_image"));
        }
        self.cells[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// All cells, address order
    pub fn as_slice(&self) -> &[u8] {
        &self.cells
    }

    /// Zero every cell
    pub fn clear(&mut self) {
        self.cells = [0; MEMORY_SIZE];
    }
}
