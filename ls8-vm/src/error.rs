//! LS-8 VM error types
//!
//! Re-exports ls8-error and provides VM-specific conveniences.

pub use ls8_error::{Error, ErrorKind, Result};

// =============================================================================
// VM-specific error constructors
// =============================================================================

/// Create an IllegalOpcode error
pub fn illegal_opcode(opcode: u8) -> Error {
    Error::new(
        ErrorKind::IllegalOpcode,
        format!("no instruction for opcode {:#010b}", opcode),
    )
    .with_context("opcode", format!("{:#04X}", opcode))
}

/// Create an UnsupportedOperation error
pub fn unsupported_operation(name: impl Into<String>) -> Error {
    let name = name.into();
    Error::new(
        ErrorKind::UnsupportedOperation,
        format!("unsupported ALU operation '{}'", name),
    )
    .with_context("operation", name)
}

/// Create an OutOfBounds error for a memory address
pub fn out_of_bounds(address: usize) -> Error {
    Error::new(
        ErrorKind::OutOfBounds,
        format!("address {} outside memory 0..=255", address),
    )
    .with_context("address", address.to_string())
}

/// Create an InvalidRegister error
pub fn invalid_register(index: u8) -> Error {
    Error::new(
        ErrorKind::InvalidRegister,
        format!("register R{} does not exist", index),
    )
    .with_context("register", index.to_string())
}

/// Create a stack overflow error (SP would drop below 0)
pub fn stack_overflow(sp: u8) -> Error {
    Error::new(ErrorKind::OutOfBounds, "stack pointer decremented below 0x00")
        .with_context("sp", format!("{:#04X}", sp))
}

/// Create a stack underflow error (SP would rise above 255)
pub fn stack_underflow(sp: u8) -> Error {
    Error::new(ErrorKind::OutOfBounds, "stack pointer incremented past 0xFF")
        .with_context("sp", format!("{:#04X}", sp))
}

/// Create a ProgramNotFound error
pub fn program_not_found(path: impl Into<String>) -> Error {
    Error::program_not_found(path)
}

/// Create a ParseFailed error for a program line
pub fn parse_error(line: usize, text: impl Into<String>) -> Error {
    let text = text.into();
    Error::parse_failed(format!("line {}: '{}' is not an 8-bit binary literal", line, text))
        .with_context("line", line.to_string())
}

/// Create an OutOfBounds error for a program that cannot fit in memory
pub fn program_too_large(len: usize) -> Error {
    Error::new(
        ErrorKind::OutOfBounds,
        format!("program of {} bytes does not fit in 256 bytes of memory", len),
    )
    .with_context("len", len.to_string())
}

/// Create a StepLimitExceeded error
pub fn step_limit_exceeded(max: u64) -> Error {
    Error::new(
        ErrorKind::StepLimitExceeded,
        format!("no HLT within {} instructions", max),
    )
    .with_context("max_steps", max.to_string())
}

/// Create an IoFailed error for the PRN output sink
pub fn output_failed(err: std::io::Error) -> Error {
    Error::new(ErrorKind::IoFailed, "failed to write program output")
        .with_operation("machine::prn")
        .set_source(err)
}
