//! Arithmetic/logic unit and the comparison flags it produces.

use crate::error::{self, Error, Result};
use crate::opcode::Opcode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Operations the ALU implements
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AluOp {
    Add,
    Mul,
    Cmp,
}

impl AluOp {
    pub fn name(self) -> &'static str {
        match self {
            AluOp::Add => "ADD",
            AluOp::Mul => "MUL",
            AluOp::Cmp => "CMP",
        }
    }
}

impl FromStr for AluOp {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ADD" => Ok(AluOp::Add),
            "MUL" => Ok(AluOp::Mul),
            "CMP" => Ok(AluOp::Cmp),
            other => Err(error::unsupported_operation(other).with_operation("alu::parse")),
        }
    }
}

impl TryFrom<Opcode> for AluOp {
    type Error = Error;

    fn try_from(op: Opcode) -> Result<Self> {
        match op {
            Opcode::Add => Ok(AluOp::Add),
            Opcode::Mul => Ok(AluOp::Mul),
            Opcode::Cmp => Ok(AluOp::Cmp),
            other => Err(error::unsupported_operation(other.mnemonic()).with_operation("alu::decode")),
        }
    }
}

impl fmt::Display for AluOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Result of the last CMP. Only `equal` feeds the conditional jumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flags {
    pub equal: bool,
    pub less: bool,
    pub greater: bool,
}

impl Flags {
    pub fn from_ordering(ordering: Ordering) -> Self {
        Self {
            equal: ordering == Ordering::Equal,
            less: ordering == Ordering::Less,
            greater: ordering == Ordering::Greater,
        }
    }

    /// Packed `00000LGE` form of the FL register
    pub fn bits(&self) -> u8 {
        (self.less as u8) << 2 | (self.greater as u8) << 1 | self.equal as u8
    }
}

/// Outcome of one ALU operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AluOutput {
    /// Value to store back into register A
    Value(u8),
    /// New flag state; registers untouched
    Flags(Flags),
}

/// Apply `op` to two register values. Arithmetic wraps modulo 256.
pub fn execute(op: AluOp, a: u8, b: u8) -> AluOutput {
    match op {
        AluOp::Add => AluOutput::Value(a.wrapping_add(b)),
        AluOp::Mul => AluOutput::Value(a.wrapping_mul(b)),
        AluOp::Cmp => AluOutput::Flags(Flags::from_ordering(a.cmp(&b))),
    }
}
