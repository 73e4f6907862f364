//! # LS-8 Opcodes
//!
//! The instruction set of the machine. Every opcode is one byte whose bits
//! describe the instruction shape:
//!
//! ```text
//! AABCDDDD
//! AA   number of operands (0-2)
//! B    1 if the instruction is executed by the ALU
//! C    1 if the instruction sets the PC itself
//! DDDD instruction identifier
//! ```

use crate::error::{self, Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// LS-8 Opcode - one variant per supported instruction byte
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum Opcode {
    // =========================================================================
    // REGISTER / IO
    // =========================================================================
    /// Load an immediate into a register
    Ldi = 0b1000_0010,
    /// Print the decimal value of a register
    Prn = 0b0100_0111,
    /// Halt the machine
    Hlt = 0b0000_0001,

    // =========================================================================
    // ALU
    // =========================================================================
    /// regA = regA * regB
    Mul = 0b1010_0010,
    /// regA = regA + regB
    Add = 0b1010_0000,
    /// Compare two registers and set the flags
    Cmp = 0b1010_0111,

    // =========================================================================
    // STACK
    // =========================================================================
    /// Pop the top of the stack into a register
    Pop = 0b0100_0110,
    /// Push a register onto the stack
    Push = 0b0100_0101,

    // =========================================================================
    // CONTROL FLOW
    // =========================================================================
    /// Push the return address and jump to the address in a register
    Call = 0b0101_0000,
    /// Pop the return address into the PC
    Ret = 0b0001_0001,
    /// Jump to the address in a register
    Jmp = 0b0101_0100,
    /// Jump if the equal flag is set
    Jeq = 0b0101_0101,
    /// Jump if the equal flag is clear
    Jne = 0b0101_0110,
}

impl Opcode {
    /// Every opcode, in table order
    pub const ALL: [Opcode; 13] = [
        Opcode::Ldi,
        Opcode::Prn,
        Opcode::Hlt,
        Opcode::Mul,
        Opcode::Add,
        Opcode::Cmp,
        Opcode::Pop,
        Opcode::Push,
        Opcode::Call,
        Opcode::Ret,
        Opcode::Jmp,
        Opcode::Jeq,
        Opcode::Jne,
    ];

    /// The raw instruction byte
    pub fn byte(self) -> u8 {
        self as u8
    }

    /// Assembly mnemonic
    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::Ldi => "LDI",
            Opcode::Prn => "PRN",
            Opcode::Hlt => "HLT",
            Opcode::Mul => "MUL",
            Opcode::Add => "ADD",
            Opcode::Cmp => "CMP",
            Opcode::Pop => "POP",
            Opcode::Push => "PUSH",
            Opcode::Call => "CALL",
            Opcode::Ret => "RET",
            Opcode::Jmp => "JMP",
            Opcode::Jeq => "JEQ",
            Opcode::Jne => "JNE",
        }
    }

    /// Number of operand bytes following the opcode
    pub fn operand_count(self) -> usize {
        (self.byte() >> 6) as usize
    }

    /// Instruction length in bytes, opcode included
    pub fn instruction_len(self) -> usize {
        1 + self.operand_count()
    }

    /// Check if the ALU executes this instruction
    pub fn is_alu(self) -> bool {
        self.byte() & 0b0010_0000 != 0
    }

    /// Check if this instruction sets the PC instead of advancing it
    pub fn sets_pc(self) -> bool {
        self.byte() & 0b0001_0000 != 0
    }

    /// Check if this opcode stops the machine
    pub fn is_terminal(self) -> bool {
        matches!(self, Opcode::Hlt)
    }

    /// Check if this opcode touches the stack
    pub fn is_stack_op(self) -> bool {
        matches!(self, Opcode::Push | Opcode::Pop | Opcode::Call | Opcode::Ret)
    }

    /// Render a decoded instruction, e.g. `LDI R0, 8`
    pub fn format_instruction(self, operands: &[u8]) -> String {
        let (name, args) = self.format_parts(operands);
        if args.is_empty() {
            name.to_string()
        } else {
            format!("{} {}", name, args)
        }
    }

    fn format_parts(self, operands: &[u8]) -> (&'static str, String) {
        let reg = |i: usize| {
            operands
                .get(i)
                .map(|r| format!("R{}", r))
                .unwrap_or_else(|| "?".to_string())
        };
        let args = match self {
            Opcode::Hlt | Opcode::Ret => String::new(),
            Opcode::Ldi => {
                let value = operands
                    .get(1)
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "?".to_string());
                format!("{}, {}", reg(0), value)
            }
            Opcode::Mul | Opcode::Add | Opcode::Cmp => format!("{}, {}", reg(0), reg(1)),
            Opcode::Prn
            | Opcode::Pop
            | Opcode::Push
            | Opcode::Call
            | Opcode::Jmp
            | Opcode::Jeq
            | Opcode::Jne => reg(0),
        };
        (self.mnemonic(), args)
    }
}

impl TryFrom<u8> for Opcode {
    type Error = Error;

    fn try_from(byte: u8) -> Result<Self> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.byte() == byte)
            .ok_or_else(|| error::illegal_opcode(byte))
    }
}

impl FromStr for Opcode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let upper = s.trim().to_ascii_uppercase();
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.mnemonic() == upper)
            .ok_or_else(|| Error::invalid_argument(format!("unknown mnemonic '{}'", s)))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}
