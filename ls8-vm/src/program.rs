//! # LS-8 Programs
//!
//! Program images and the text format they are loaded from: one 8-bit
//! binary literal per line, `#` starts a comment, blank lines are skipped.
//!
//! ```text
//! # print8.ls8
//! 10000010 # LDI R0,8
//! 00000000
//! 00001000
//! 01000111 # PRN R0
//! 00000000
//! 00000001 # HLT
//! ```

use crate::error::{self, Error, ErrorKind, Result};
use crate::memory::MEMORY_SIZE;
use crate::opcode::Opcode;
use std::path::Path;

/// A parsed program image, ready to be copied into memory at address 0
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    bytes: Vec<u8>,
}

impl Program {
    /// Wrap raw bytes. Fails if they cannot fit in memory.
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self> {
        let bytes = bytes.into();
        if bytes.len() > MEMORY_SIZE {
            return Err(error::program_too_large(bytes.len()).with_operation("program::from_bytes"));
        }
        Ok(Self { bytes })
    }

    /// Parse the text format
    pub fn parse(source: &str) -> Result<Self> {
        let mut bytes = Vec::new();

        for (index, line) in source.lines().enumerate() {
            let code = line.split('#').next().unwrap_or("").trim();
            if code.is_empty() {
                continue;
            }
            let byte = u8::from_str_radix(code, 2)
                .map_err(|e| error::parse_error(index + 1, code).set_source(e))?;
            bytes.push(byte);
        }

        Self::from_bytes(bytes).map_err(|e| e.with_operation("program::parse"))
    }

    /// Read and parse a program file.
    ///
    /// Any failure to open the file is reported as `ProgramNotFound`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            let err = match e.kind() {
                std::io::ErrorKind::InvalidData => Error::new(
                    ErrorKind::ParseFailed,
                    format!("program '{}' is not valid UTF-8", path.display()),
                ),
                _ => error::program_not_found(path.display().to_string()),
            };
            err.with_operation("program::from_file").set_source(e)
        })?;

        let program = Self::parse(&source)
            .map_err(|e| e.with_context("path", path.display().to_string()))?;
        tracing::debug!(path = %path.display(), bytes = program.len(), "program loaded");
        Ok(program)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Render one line per instruction, e.g. `00: LDI R0, 8`.
    ///
    /// Bytes that do not decode are shown as `DB 0xNN` and skipped one at a
    /// time; this is a linear sweep, so data laid out after code is decoded
    /// as if it were instructions.
    pub fn disassemble(&self) -> Vec<String> {
        let mut lines = Vec::new();
        let mut addr = 0;

        while addr < self.bytes.len() {
            let byte = self.bytes[addr];
            match Opcode::try_from(byte) {
                Ok(op) => {
                    let end = (addr + op.instruction_len()).min(self.bytes.len());
                    let operands = &self.bytes[addr + 1..end];
                    lines.push(format!("{:02X}: {}", addr, op.format_instruction(operands)));
                    addr += op.instruction_len();
                }
                Err(_) => {
                    lines.push(format!("{:02X}: DB {:#04X}", addr, byte));
                    addr += 1;
                }
            }
        }

        lines
    }
}
