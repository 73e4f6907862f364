//! # LS-8 Machine
//!
//! Owns the register file, memory, PC and flags, and runs the
//! fetch/decode/execute loop. Each handler advances the PC by its own
//! instruction length; jumps, CALL and RET set it directly.
//!
//! ```rust
//! use ls8_vm::{Machine, Program};
//!
//! let program = Program::parse("10000010\n00000000\n00001000\n01000111\n00000000\n00000001\n")?;
//! let mut machine = Machine::with_output(Vec::new());
//! machine.load(&program)?;
//! machine.run()?;
//! assert_eq!(machine.output(), b"8\n");
//! # Ok::<(), ls8_vm::Error>(())
//! ```

use crate::alu::{self, AluOp, AluOutput, Flags};
use crate::error::{self, Result};
use crate::memory::{Ram, MEMORY_SIZE};
use crate::opcode::Opcode;
use crate::program::Program;
use crate::registers::{Registers, REGISTER_COUNT};
use crate::stack::Stack;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::{self, Write};

/// Run state. HALTED is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Running,
    Halted,
}

/// Execution settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MachineConfig {
    /// Abort with `StepLimitExceeded` after this many instructions
    pub max_steps: Option<u64>,
    /// Emit a trace line before every instruction
    pub trace: bool,
}

impl MachineConfig {
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }
}

/// Machine state just before an instruction executes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceLine {
    pub pc: usize,
    /// Bytes at PC, PC+1, PC+2; `None` past the end of memory
    pub bytes: [Option<u8>; 3],
    pub registers: [u8; REGISTER_COUNT],
}

impl fmt::Display for TraceLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TRACE: {:02X} |", self.pc)?;
        for byte in &self.bytes {
            match byte {
                Some(b) => write!(f, " {:02X}", b)?,
                None => write!(f, " --")?,
            }
        }
        write!(f, " |")?;
        for reg in &self.registers {
            write!(f, " {:02X}", reg)?;
        }
        Ok(())
    }
}

/// Serialisable copy of the full machine state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineSnapshot {
    pub pc: usize,
    pub registers: Registers,
    pub flags: Flags,
    pub state: RunState,
    pub steps: u64,
    pub memory: Vec<u8>,
}

type TraceCallback = Box<dyn FnMut(&TraceLine)>;

/// The LS-8 CPU. PRN output goes to `W`.
pub struct Machine<W: Write = io::Stdout> {
    ram: Ram,
    registers: Registers,
    pc: usize,
    flags: Flags,
    state: RunState,
    steps: u64,
    config: MachineConfig,
    output: W,
    trace_callback: Option<TraceCallback>,
}

impl Default for Machine<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine<io::Stdout> {
    /// Machine printing to stdout
    pub fn new() -> Self {
        Self::with_output(io::stdout())
    }
}

impl<W: Write> Machine<W> {
    /// Machine printing to the given sink
    pub fn with_output(output: W) -> Self {
        Self {
            ram: Ram::new(),
            registers: Registers::new(),
            pc: 0,
            flags: Flags::default(),
            state: RunState::Running,
            steps: 0,
            config: MachineConfig::default(),
            output,
            trace_callback: None,
        }
    }

    pub fn with_config(mut self, config: MachineConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a callback receiving a trace line per instruction.
    /// Enables tracing.
    pub fn with_trace_callback<F>(mut self, callback: F) -> Self
    where
        F: FnMut(&TraceLine) + 'static,
    {
        self.config.trace = true;
        self.trace_callback = Some(Box::new(callback));
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn registers_mut(&mut self) -> &mut Registers {
        &mut self.registers
    }

    pub fn ram(&self) -> &Ram {
        &self.ram
    }

    pub fn ram_mut(&mut self) -> &mut Ram {
        &mut self.ram
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn config(&self) -> &MachineConfig {
        &self.config
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Memory read (MAR -> MDR)
    pub fn ram_read(&self, address: usize) -> Result<u8> {
        self.ram.read(address)
    }

    pub fn ram_write(&mut self, address: usize, value: u8) -> Result<()> {
        self.ram.write(address, value)
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Copy a program into memory from address 0
    pub fn load(&mut self, program: &Program) -> Result<()> {
        self.ram
            .load_image(program.as_bytes())
            .map_err(|e| e.with_operation("machine::load"))?;
        tracing::debug!(bytes = program.len(), "program copied into memory");
        Ok(())
    }

    /// Run until HLT. Returns the number of instructions executed.
    pub fn run(&mut self) -> Result<u64> {
        while self.state == RunState::Running {
            if let Some(max) = self.config.max_steps {
                if self.steps >= max {
                    return Err(error::step_limit_exceeded(max)
                        .with_operation("machine::run")
                        .with_context("pc", format!("{:#04X}", self.pc)));
                }
            }
            self.step()?;
        }
        tracing::debug!(steps = self.steps, "machine halted");
        Ok(self.steps)
    }

    /// Execute exactly one instruction. A halted machine stays halted.
    pub fn step(&mut self) -> Result<RunState> {
        if self.state == RunState::Halted {
            return Ok(RunState::Halted);
        }

        let pc = self.pc;
        self.emit_trace();

        let ir = self
            .ram
            .read(pc)
            .map_err(|e| e.with_operation("machine::fetch"))?;
        let opcode = Opcode::try_from(ir).map_err(|e| {
            e.with_operation("machine::decode")
                .with_context("pc", format!("{:#04X}", pc))
        })?;
        tracing::trace!(pc, op = opcode.mnemonic(), "execute");

        self.execute(opcode).map_err(|e| {
            e.with_operation("machine::execute")
                .with_context("pc", format!("{:#04X}", pc))
                .with_context("instruction", opcode.mnemonic())
        })?;
        self.steps += 1;

        Ok(self.state)
    }

    /// Current state as a trace line
    pub fn trace(&self) -> TraceLine {
        TraceLine {
            pc: self.pc,
            bytes: [
                self.ram.peek(self.pc),
                self.ram.peek(self.pc + 1),
                self.ram.peek(self.pc + 2),
            ],
            registers: *self.registers.as_array(),
        }
    }

    pub fn snapshot(&self) -> MachineSnapshot {
        MachineSnapshot {
            pc: self.pc,
            registers: self.registers,
            flags: self.flags,
            state: self.state,
            steps: self.steps,
            memory: self.ram.as_slice().to_vec(),
        }
    }

    /// Apply an ALU operation to registers `reg_a` and `reg_b`
    pub fn alu(&mut self, op: AluOp, reg_a: u8, reg_b: u8) -> Result<()> {
        let a = self.registers.get(reg_a)?;
        let b = self.registers.get(reg_b)?;
        match alu::execute(op, a, b) {
            AluOutput::Value(value) => self.registers.set(reg_a, value),
            AluOutput::Flags(flags) => {
                self.flags = flags;
                Ok(())
            }
        }
    }

    fn emit_trace(&mut self) {
        if !self.config.trace {
            return;
        }
        let line = self.trace();
        match self.trace_callback.as_mut() {
            Some(callback) => callback(&line),
            None => tracing::info!(target: "ls8::trace", "{}", line),
        }
    }

    // =========================================================================
    // Instruction handlers
    // =========================================================================

    fn execute(&mut self, opcode: Opcode) -> Result<()> {
        match opcode {
            Opcode::Ldi => self.handle_ldi(),
            Opcode::Prn => self.handle_prn(),
            Opcode::Hlt => self.handle_hlt(),
            Opcode::Mul | Opcode::Add | Opcode::Cmp => self.handle_alu(opcode),
            Opcode::Pop => self.handle_pop(),
            Opcode::Push => self.handle_push(),
            Opcode::Call => self.handle_call(),
            Opcode::Ret => self.handle_ret(),
            Opcode::Jmp => self.handle_jmp(),
            Opcode::Jeq => self.handle_jump_if(self.flags.equal),
            Opcode::Jne => self.handle_jump_if(!self.flags.equal),
        }
    }

    /// Operand `n` bytes after the opcode
    fn operand(&self, n: usize) -> Result<u8> {
        self.ram.read(self.pc + n)
    }

    /// Address of the next instruction `n` bytes on. Fails if it would leave
    /// memory; checked before any side effect so a faulting instruction
    /// changes nothing.
    fn next_pc(&self, n: usize) -> Result<usize> {
        let next = self.pc + n;
        if next < MEMORY_SIZE {
            Ok(next)
        } else {
            Err(error::out_of_bounds(next))
        }
    }

    fn handle_ldi(&mut self) -> Result<()> {
        let reg = self.operand(1)?;
        let value = self.operand(2)?;
        let next = self.next_pc(3)?;
        self.registers.set(reg, value)?;
        self.pc = next;
        Ok(())
    }

    fn handle_prn(&mut self) -> Result<()> {
        let reg = self.operand(1)?;
        let value = self.registers.get(reg)?;
        let next = self.next_pc(2)?;
        writeln!(self.output, "{}", value).map_err(error::output_failed)?;
        self.pc = next;
        Ok(())
    }

    fn handle_hlt(&mut self) -> Result<()> {
        self.state = RunState::Halted;
        Ok(())
    }

    fn handle_alu(&mut self, opcode: Opcode) -> Result<()> {
        let op = AluOp::try_from(opcode)?;
        let reg_a = self.operand(1)?;
        let reg_b = self.operand(2)?;
        let next = self.next_pc(3)?;
        self.alu(op, reg_a, reg_b)?;
        self.pc = next;
        Ok(())
    }

    fn handle_pop(&mut self) -> Result<()> {
        let reg = self.operand(1)?;
        // Validate the destination before SP moves.
        self.registers.get(reg)?;
        let next = self.next_pc(2)?;
        let value = Stack::new(&mut self.ram, &mut self.registers).pop()?;
        self.registers.set(reg, value)?;
        self.pc = next;
        Ok(())
    }

    fn handle_push(&mut self) -> Result<()> {
        let reg = self.operand(1)?;
        let value = self.registers.get(reg)?;
        let next = self.next_pc(2)?;
        Stack::new(&mut self.ram, &mut self.registers).push(value)?;
        self.pc = next;
        Ok(())
    }

    fn handle_call(&mut self) -> Result<()> {
        let reg = self.operand(1)?;
        let return_addr = u8::try_from(self.pc + 2).map_err(|_| error::out_of_bounds(self.pc + 2))?;
        self.registers.get(reg)?;
        Stack::new(&mut self.ram, &mut self.registers).push(return_addr)?;
        self.pc = self.registers.get(reg)? as usize;
        Ok(())
    }

    fn handle_ret(&mut self) -> Result<()> {
        self.pc = Stack::new(&mut self.ram, &mut self.registers).pop()? as usize;
        Ok(())
    }

    fn handle_jmp(&mut self) -> Result<()> {
        let reg = self.operand(1)?;
        self.pc = self.registers.get(reg)? as usize;
        Ok(())
    }

    fn handle_jump_if(&mut self, condition: bool) -> Result<()> {
        let reg = self.operand(1)?;
        self.pc = if condition {
            self.registers.get(reg)? as usize
        } else {
            // Fall-through never reads the target register.
            self.next_pc(2)?
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registers::{SP, SP_INIT};
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const LDI: u8 = 0b1000_0010;
    const PRN: u8 = 0b0100_0111;
    const HLT: u8 = 0b0000_0001;
    const MUL: u8 = 0b1010_0010;
    const ADD: u8 = 0b1010_0000;
    const CMP: u8 = 0b1010_0111;
    const POP: u8 = 0b0100_0110;
    const PUSH: u8 = 0b0100_0101;
    const CALL: u8 = 0b0101_0000;
    const RET: u8 = 0b0001_0001;
    const JMP: u8 = 0b0101_0100;
    const JEQ: u8 = 0b0101_0101;
    const JNE: u8 = 0b0101_0110;

    fn machine(bytes: &[u8]) -> Machine<Vec<u8>> {
        let mut m = Machine::with_output(Vec::new());
        m.load(&Program::from_bytes(bytes.to_vec()).unwrap()).unwrap();
        m
    }

    fn run(bytes: &[u8]) -> Machine<Vec<u8>> {
        let mut m = machine(bytes);
        m.run().unwrap();
        m
    }

    fn printed(m: &Machine<Vec<u8>>) -> String {
        String::from_utf8(m.output().clone()).unwrap()
    }

    #[test]
    fn test_initial_state() {
        let m = Machine::with_output(Vec::new());
        assert_eq!(m.pc(), 0);
        assert_eq!(m.registers().sp(), SP_INIT);
        assert_eq!(m.flags(), Flags::default());
        assert_eq!(m.state(), RunState::Running);
    }

    #[test]
    fn test_mult_program() {
        let m = run(&[LDI, 0, 8, LDI, 1, 9, MUL, 0, 1, PRN, 0, HLT]);
        assert_eq!(printed(&m), "72\n");
        assert_eq!(m.state(), RunState::Halted);
        assert_eq!(m.steps(), 5);
        assert_eq!(m.pc(), 11);
    }

    #[test]
    fn test_add_wraps() {
        let m = run(&[LDI, 0, 250, LDI, 1, 10, ADD, 0, 1, PRN, 0, HLT]);
        assert_eq!(printed(&m), "4\n");
    }

    #[test]
    fn test_push_pop_lifo() {
        let m = run(&[
            LDI, 0, 5, LDI, 1, 6, PUSH, 0, PUSH, 1, POP, 2, POP, 3, HLT,
        ]);
        assert_eq!(m.registers().get(2).unwrap(), 6);
        assert_eq!(m.registers().get(3).unwrap(), 5);
        assert_eq!(m.registers().sp(), SP_INIT);
    }

    #[test]
    fn test_call_ret() {
        // 00: LDI R1, 10
        // 03: CALL R1
        // 05: PRN R0
        // 07: HLT
        // 0A: LDI R0, 42 / RET
        let m = run(&[
            LDI, 1, 0x0A, CALL, 1, PRN, 0, HLT, 0, 0, LDI, 0, 42, RET,
        ]);
        assert_eq!(printed(&m), "42\n");
        assert_eq!(m.registers().sp(), SP_INIT);
    }

    #[test]
    fn test_call_pushes_return_address() {
        let mut m = machine(&[LDI, 1, 0x10, CALL, 1]);
        m.step().unwrap();
        m.step().unwrap();
        assert_eq!(m.pc(), 0x10);
        assert_eq!(m.registers().sp(), SP_INIT - 1);
        assert_eq!(m.ram_read((SP_INIT - 1) as usize).unwrap(), 5);
    }

    #[test]
    fn test_jmp() {
        // 00: LDI R0, 8 / JMP R0 / (skipped PRN R1) / 08: HLT
        let m = run(&[LDI, 0, 8, JMP, 0, PRN, 1, 0, HLT]);
        assert_eq!(printed(&m), "");
        assert_eq!(m.pc(), 8);
    }

    #[test]
    fn test_jeq_jne() {
        // 00: LDI R0, 1
        // 03: LDI R1, 1
        // 06: LDI R2, 0x14
        // 09: CMP R0, R1
        // 0C: JNE R2   -> not taken
        // 0E: JEQ R2   -> taken
        // 10: PRN R0 / HLT (skipped)
        // 14: PRN R2 / HLT
        let m = run(&[
            LDI, 0, 1, LDI, 1, 1, LDI, 2, 0x14, CMP, 0, 1, JNE, 2, JEQ, 2, PRN, 0, HLT, 0,
            PRN, 2, HLT,
        ]);
        assert_eq!(printed(&m), "20\n");
        assert!(m.flags().equal);
    }

    #[test]
    fn test_cmp_overwrites_flags() {
        let mut m = machine(&[LDI, 0, 1, LDI, 1, 2, CMP, 0, 0, CMP, 0, 1, HLT]);
        m.run().unwrap();
        let flags = m.flags();
        assert!(!flags.equal);
        assert!(flags.less);
        assert!(!flags.greater);
    }

    #[test]
    fn test_illegal_opcode() {
        let mut m = machine(&[LDI, 0, 1, 0xFF]);
        let err = m.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IllegalOpcode);
        assert_eq!(err.operation(), "machine::decode");
        assert_eq!(err.context_value("pc"), Some("0x03"));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn test_unloaded_memory_is_illegal() {
        let mut m = Machine::with_output(Vec::new());
        assert!(m.run().is_err_and(|e| e.kind() == ErrorKind::IllegalOpcode));
    }

    #[test]
    fn test_pc_runs_off_memory() {
        let mut m = Machine::with_output(Vec::new());
        m.ram_write(0xFF, LDI).unwrap();
        m.registers_mut().set(0, 0xFF).unwrap();
        m.ram_write(0, JMP).unwrap();
        m.ram_write(1, 0).unwrap();
        let err = m.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(err.context_value("instruction"), Some("LDI"));
    }

    #[test]
    fn test_pc_stays_in_memory_after_last_instruction() {
        // 00: JMP R0 (R0 = 0xFE) / FE: PRN R1
        let mut m = Machine::with_output(Vec::new());
        m.registers_mut().set(0, 0xFE).unwrap();
        m.ram_write(0, JMP).unwrap();
        m.ram_write(0xFE, PRN).unwrap();
        m.ram_write(0xFF, 1).unwrap();
        m.step().unwrap();

        let err = m.step().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(err.context_value("address"), Some("256"));
        assert_eq!(err.context_value("instruction"), Some("PRN"));
        assert_eq!(m.pc(), 0xFE);
        assert_eq!(m.snapshot().pc, 0xFE);
        assert!(m.output().is_empty());
    }

    #[test]
    fn test_alu_at_end_of_memory_leaves_registers() {
        let mut m = Machine::with_output(Vec::new());
        m.registers_mut().set(0, 0xFD).unwrap();
        m.registers_mut().set(1, 2).unwrap();
        m.ram_write(0, JMP).unwrap();
        m.ram_write(0xFD, ADD).unwrap();
        m.ram_write(0xFE, 1).unwrap();
        m.ram_write(0xFF, 1).unwrap();
        m.step().unwrap();

        let err = m.step().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(m.pc(), 0xFD);
        assert_eq!(m.registers().get(1).unwrap(), 2);
    }

    #[test]
    fn test_call_return_address_past_memory() {
        // FE: CALL R0 -> return address 0x100
        let mut m = Machine::with_output(Vec::new());
        m.registers_mut().set(0, 0xFE).unwrap();
        m.ram_write(0, JMP).unwrap();
        m.ram_write(0xFE, CALL).unwrap();
        m.ram_write(0xFF, 0).unwrap();
        m.step().unwrap();

        let err = m.step().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(err.context_value("instruction"), Some("CALL"));
        assert_eq!(m.registers().sp(), SP_INIT);
        assert_eq!(m.pc(), 0xFE);
    }

    #[test]
    fn test_untaken_branch_ignores_target_register() {
        // CMP sets E, so JNE R9 falls through without touching R9.
        let m = run(&[CMP, 0, 0, JNE, 9, PRN, 0, HLT]);
        assert_eq!(printed(&m), "0\n");

        let mut m = machine(&[CMP, 0, 0, JEQ, 9]);
        let err = m.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRegister);
    }

    #[test]
    fn test_invalid_register_operand() {
        let mut m = machine(&[LDI, 9, 1, HLT]);
        let err = m.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRegister);
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn test_stack_overflow_is_fatal() {
        let mut m = machine(&[LDI, SP, 0, PUSH, 0, HLT]);
        let err = m.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
        assert_eq!(m.registers().sp(), 0);
    }

    #[test]
    fn test_ret_on_top_of_memory() {
        let mut m = machine(&[LDI, SP, 0xFF, RET]);
        let err = m.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfBounds);
    }

    #[test]
    fn test_step_after_halt() {
        let mut m = machine(&[HLT]);
        assert_eq!(m.step().unwrap(), RunState::Halted);
        assert_eq!(m.step().unwrap(), RunState::Halted);
        assert_eq!(m.steps(), 1);
        assert_eq!(m.pc(), 0);
    }

    #[test]
    fn test_step_limit() {
        // 00: LDI R0, 3 / 03: JMP R0 -> loops forever
        let mut m = machine(&[LDI, 0, 3, JMP, 0])
            .with_config(MachineConfig::default().with_max_steps(10));
        let err = m.run().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StepLimitExceeded);
        assert_eq!(m.steps(), 10);
    }

    #[test]
    fn test_alu_direct() {
        let mut m = Machine::with_output(Vec::new());
        m.registers_mut().set(0, 3).unwrap();
        m.registers_mut().set(1, 4).unwrap();
        m.alu(AluOp::Mul, 0, 1).unwrap();
        assert_eq!(m.registers().get(0).unwrap(), 12);
        assert!(m.alu(AluOp::Add, 0, 8).is_err());
    }

    #[test]
    fn test_trace_callback() {
        let lines = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&lines);
        let mut m = machine(&[LDI, 0, 8, HLT])
            .with_trace_callback(move |line| sink.borrow_mut().push(line.to_string()));
        m.run().unwrap();

        let lines = lines.borrow();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "TRACE: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4");
        assert_eq!(lines[1], "TRACE: 03 | 01 00 00 | 08 00 00 00 00 00 00 F4");
    }

    #[test]
    fn test_trace_past_end_of_memory() {
        let mut m = Machine::with_output(Vec::new());
        m.registers_mut().set(0, 0xFF).unwrap();
        m.ram_write(0, JMP).unwrap();
        m.step().unwrap();
        assert_eq!(m.trace().to_string(), "TRACE: FF | 00 -- -- | FF 00 00 00 00 00 00 F4");
    }

    #[test]
    fn test_snapshot_serializes() {
        let m = run(&[LDI, 0, 8, HLT]);
        let snapshot = m.snapshot();
        assert_eq!(snapshot.state, RunState::Halted);
        assert_eq!(snapshot.memory.len(), 256);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "halted");
        assert_eq!(json["pc"], 3);
        let back: MachineSnapshot = serde_json::from_value(json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_runs_are_independent() {
        let first = run(&[LDI, 0, 1, LDI, 1, 1, CMP, 0, 1, HLT]);
        assert!(first.flags().equal);

        let second = Machine::with_output(Vec::new());
        assert!(!second.flags().equal);
    }

    proptest! {
        #[test]
        fn ldi_then_prn_prints_value(reg in 0u8..7, value in any::<u8>()) {
            let m = run(&[LDI, reg, value, PRN, reg, HLT]);
            prop_assert_eq!(printed(&m), format!("{}\n", value));
        }

        #[test]
        fn push_pop_restores(value in any::<u8>()) {
            let m = run(&[LDI, 0, value, PUSH, 0, LDI, 0, 0, POP, 0, HLT]);
            prop_assert_eq!(m.registers().get(0).unwrap(), value);
            prop_assert_eq!(m.registers().sp(), SP_INIT);
        }

        #[test]
        fn jeq_jne_follow_equal_flag(a in any::<u8>(), b in any::<u8>()) {
            // CMP R0,R1 then JEQ R2 (or JNE R2) to 0x10; fallthrough lands at 0x0E.
            for (jump, taken_when_equal) in [(JEQ, true), (JNE, false)] {
                let mut m = machine(&[
                    LDI, 0, a, LDI, 1, b, LDI, 2, 0x10, CMP, 0, 1, jump, 2,
                ]);
                for _ in 0..5 {
                    m.step().unwrap();
                }
                let taken = (a == b) == taken_when_equal;
                let expected = if taken { 0x10 } else { 0x0E };
                prop_assert_eq!(m.pc(), expected);
            }
        }
    }
}
