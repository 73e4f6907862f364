//! # LS-8 VM
//!
//! An emulator for a small 8-bit instruction set.
//!
//! ## Core Concepts
//! - **Memory**: 256 byte cells holding both the program and the stack
//! - **Registers**: R0-R7, with R7 aliased as the stack pointer
//! - **Opcodes**: One-byte instructions taking zero, one or two operands
//! - **Machine**: The fetch/decode/execute loop, running until HLT
//! - **Program**: Text images of binary literals, loaded at address 0

pub mod opcode;
pub mod error;
pub mod memory;
pub mod registers;
pub mod stack;
pub mod alu;
pub mod program;
pub mod schema;
pub mod machine;

pub use opcode::Opcode;
pub use error::{Error, ErrorKind, Result};
pub use memory::{Ram, MEMORY_SIZE};
pub use registers::{Registers, REGISTER_COUNT, SP, SP_INIT};
pub use stack::Stack;
pub use alu::{AluOp, Flags};
pub use program::Program;
pub use schema::IsaSchema;
pub use machine::{Machine, MachineConfig, MachineSnapshot, RunState, TraceLine};
