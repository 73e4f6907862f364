//! # ISA Schema
//!
//! A structured description of the instruction set and machine state that
//! can be printed for humans or serialized as JSON for tooling.

use crate::memory::MEMORY_SIZE;
use crate::opcode::Opcode;
use crate::registers::{REGISTER_COUNT, SP, SP_INIT};
use serde::Serialize;

/// Complete ISA description
#[derive(Debug, Clone, Serialize)]
pub struct IsaSchema {
    pub version: &'static str,
    pub description: &'static str,
    pub machine: MachineSchema,
    pub categories: Vec<OpcodeCategory>,
}

/// Sizes and reset values of the machine state
#[derive(Debug, Clone, Serialize)]
pub struct MachineSchema {
    pub memory_cells: usize,
    pub registers: usize,
    pub stack_pointer: String,
    pub stack_pointer_init: String,
    pub flags: &'static str,
}

/// A group of related opcodes
#[derive(Debug, Clone, Serialize)]
pub struct OpcodeCategory {
    pub name: &'static str,
    pub opcodes: Vec<OpcodeInfo>,
}

/// One row of the instruction table
#[derive(Debug, Clone, Serialize)]
pub struct OpcodeInfo {
    pub mnemonic: &'static str,
    pub opcode: String,
    pub operands: Vec<&'static str>,
    pub effect: &'static str,
}

impl OpcodeInfo {
    fn new(op: Opcode) -> Self {
        let (operands, effect): (Vec<&'static str>, &'static str) = match op {
            Opcode::Ldi => (vec!["reg", "value"], "reg = value"),
            Opcode::Prn => (vec!["reg"], "print reg as decimal"),
            Opcode::Hlt => (vec![], "halt the machine"),
            Opcode::Mul => (vec!["regA", "regB"], "regA = regA * regB (mod 256)"),
            Opcode::Add => (vec!["regA", "regB"], "regA = regA + regB (mod 256)"),
            Opcode::Cmp => (vec!["regA", "regB"], "set E/L/G flags from regA vs regB"),
            Opcode::Pop => (vec!["reg"], "reg = mem[SP]; SP += 1"),
            Opcode::Push => (vec!["reg"], "SP -= 1; mem[SP] = reg"),
            Opcode::Call => (vec!["reg"], "push PC+2; PC = reg"),
            Opcode::Ret => (vec![], "PC = mem[SP]; SP += 1"),
            Opcode::Jmp => (vec!["reg"], "PC = reg"),
            Opcode::Jeq => (vec!["reg"], "if E: PC = reg"),
            Opcode::Jne => (vec!["reg"], "if !E: PC = reg"),
        };
        debug_assert_eq!(operands.len(), op.operand_count());
        Self {
            mnemonic: op.mnemonic(),
            opcode: format!("{:08b}", op.byte()),
            operands,
            effect,
        }
    }
}

impl Default for IsaSchema {
    fn default() -> Self {
        Self::new()
    }
}

impl IsaSchema {
    pub fn new() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            description: "LS-8: an 8-bit machine with 256 bytes of memory, eight registers \
                          and a downward-growing stack.",
            machine: MachineSchema {
                memory_cells: MEMORY_SIZE,
                registers: REGISTER_COUNT,
                stack_pointer: format!("R{}", SP),
                stack_pointer_init: format!("{:#04X}", SP_INIT),
                flags: "E (equal), L (less), G (greater); set by CMP",
            },
            categories: Self::define_categories(),
        }
    }

    fn define_categories() -> Vec<OpcodeCategory> {
        let group = |name, ops: &[Opcode]| OpcodeCategory {
            name,
            opcodes: ops.iter().copied().map(OpcodeInfo::new).collect(),
        };
        vec![
            group("Register / IO", &[Opcode::Ldi, Opcode::Prn, Opcode::Hlt]),
            group("ALU", &[Opcode::Add, Opcode::Mul, Opcode::Cmp]),
            group("Stack", &[Opcode::Push, Opcode::Pop]),
            group(
                "Control flow",
                &[Opcode::Call, Opcode::Ret, Opcode::Jmp, Opcode::Jeq, Opcode::Jne],
            ),
        ]
    }

    /// Every documented opcode
    pub fn opcodes(&self) -> impl Iterator<Item = &OpcodeInfo> {
        self.categories.iter().flat_map(|c| c.opcodes.iter())
    }

    /// Render as a plain-text reference card
    pub fn to_text(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("# LS-8 Instruction Set (v{})\n\n", self.version));
        out.push_str(self.description);
        out.push_str("\n\n");

        out.push_str("## Machine\n\n");
        out.push_str(&format!("Memory:    {} bytes\n", self.machine.memory_cells));
        out.push_str(&format!(
            "Registers: {} (SP = {}, starts at {})\n",
            self.machine.registers, self.machine.stack_pointer, self.machine.stack_pointer_init
        ));
        out.push_str(&format!("Flags:     {}\n\n", self.machine.flags));

        for category in &self.categories {
            out.push_str(&format!("## {}\n\n", category.name));
            for op in &category.opcodes {
                let operands = op.operands.join(", ");
                out.push_str(&format!(
                    "{}  {:<5} {:<12} {}\n",
                    op.opcode, op.mnemonic, operands, op.effect
                ));
            }
            out.push('\n');
        }

        out
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_covers_every_opcode() {
        let schema = IsaSchema::new();
        let mnemonics: Vec<_> = schema.opcodes().map(|o| o.mnemonic).collect();
        assert_eq!(mnemonics.len(), Opcode::ALL.len());
        for op in Opcode::ALL {
            assert!(mnemonics.contains(&op.mnemonic()), "{} missing", op);
        }
    }

    #[test]
    fn test_to_text() {
        let text = IsaSchema::new().to_text();
        assert!(text.contains("10000010  LDI"));
        assert!(text.contains("SP = R7, starts at 0xF4"));
        assert!(text.contains("## Control flow"));
    }

    #[test]
    fn test_to_json() {
        let json = IsaSchema::new().to_json();
        assert_eq!(json["machine"]["memory_cells"], 256);
        assert_eq!(json["categories"][0]["opcodes"][0]["mnemonic"], "LDI");
        assert_eq!(json["categories"][0]["opcodes"][0]["operands"][1], "value");
    }
}
