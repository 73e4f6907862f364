//! # LS-8 Stack
//!
//! A LIFO view over the top of memory, addressed by SP (R7).
//! PUSH pre-decrements SP and writes; POP reads and post-increments.
//! SP leaving 0x00-0xFF is a fault rather than a wrap.

use crate::error::{self, Result};
use crate::memory::Ram;
use crate::registers::Registers;

/// Borrowed stack over the machine's memory and stack pointer
pub struct Stack<'a> {
    ram: &'a mut Ram,
    registers: &'a mut Registers,
}

impl<'a> Stack<'a> {
    pub fn new(ram: &'a mut Ram, registers: &'a mut Registers) -> Self {
        Self { ram, registers }
    }

    /// Push a value onto the stack
    pub fn push(&mut self, value: u8) -> Result<()> {
        let sp = self.registers.sp();
        let next = sp
            .checked_sub(1)
            .ok_or_else(|| error::stack_overflow(sp).with_operation("stack::push"))?;
        self.ram.write(next as usize, value)?;
        self.registers.set_sp(next);
        Ok(())
    }

    /// Pop a value from the stack
    pub fn pop(&mut self) -> Result<u8> {
        let sp = self.registers.sp();
        let value = self.ram.read(sp as usize)?;
        let next = sp
            .checked_add(1)
            .ok_or_else(|| error::stack_underflow(sp).with_operation("stack::pop"))?;
        self.registers.set_sp(next);
        Ok(value)
    }

    /// Peek at the top value without removing it
    pub fn peek(&self) -> Result<u8> {
        self.ram.read(self.registers.sp() as usize)
    }
}
