//! Error kinds for LS-8 operations

use std::fmt;

/// The kind of error that occurred.
///
/// Callers match on ErrorKind to decide how to report a fault; the CLI
/// turns it straight into a process exit status via [`ErrorKind::exit_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,

    /// Invalid argument passed to function
    InvalidArgument,

    // =========================================================================
    // Program loading errors
    // =========================================================================
    /// Program source could not be opened
    ProgramNotFound,

    /// A program line is not a valid 8-bit binary literal
    ParseFailed,

    // =========================================================================
    // Execution faults
    // =========================================================================
    /// Fetched byte does not name any instruction
    IllegalOpcode,

    /// ALU asked to perform an operation it does not implement
    UnsupportedOperation,

    /// Memory address, PC or SP left the 0-255 range
    OutOfBounds,

    /// Register operand outside R0-R7
    InvalidRegister,

    /// Configured instruction budget exhausted before HLT
    StepLimitExceeded,

    // =========================================================================
    // IO errors
    // =========================================================================
    /// IO operation failed
    IoFailed,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Unexpected => "Unexpected",
            ErrorKind::InvalidArgument => "InvalidArgument",

            ErrorKind::ProgramNotFound => "ProgramNotFound",
            ErrorKind::ParseFailed => "ParseFailed",

            ErrorKind::IllegalOpcode => "IllegalOpcode",
            ErrorKind::UnsupportedOperation => "UnsupportedOperation",
            ErrorKind::OutOfBounds => "OutOfBounds",
            ErrorKind::InvalidRegister => "InvalidRegister",
            ErrorKind::StepLimitExceeded => "StepLimitExceeded",

            ErrorKind::IoFailed => "IoFailed",
        }
    }

    /// Process exit status used when this kind of error ends a run.
    ///
    /// `0` is reserved for a normal HLT.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorKind::ProgramNotFound => 2,
            ErrorKind::IllegalOpcode => 3,
            ErrorKind::OutOfBounds | ErrorKind::InvalidRegister => 4,
            ErrorKind::UnsupportedOperation => 5,
            ErrorKind::ParseFailed => 6,
            ErrorKind::StepLimitExceeded => 7,
            ErrorKind::Unexpected | ErrorKind::InvalidArgument | ErrorKind::IoFailed => 1,
        }
    }

    /// Check if this kind is a fault raised while executing instructions
    pub fn is_machine_fault(&self) -> bool {
        matches!(
            self,
            ErrorKind::IllegalOpcode
                | ErrorKind::UnsupportedOperation
                | ErrorKind::OutOfBounds
                | ErrorKind::InvalidRegister
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
