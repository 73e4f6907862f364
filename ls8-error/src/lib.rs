//! # ls8-error
//!
//! Unified error handling for the LS-8 emulator.
//!
//! ## Design Philosophy
//!
//! - **ErrorKind**: Know what went wrong (e.g., IllegalOpcode, OutOfBounds)
//! - **Exit code**: Every kind maps to a process exit status
//! - **Error Context**: Locate the fault with pc/address/opcode pairs
//! - **Error Source**: Wrap underlying errors without leaking raw types
//!
//! ## Usage
//!
//! ```rust
//! use ls8_error::{Error, ErrorKind};
//!
//! fn example() -> Result<(), Error> {
//!     Err(Error::new(ErrorKind::IllegalOpcode, "illegal opcode 0xFF")
//!         .with_operation("machine::step")
//!         .with_context("pc", "0x0A")
//!         .with_context("opcode", "0xFF"))
//! }
//! ```
//!
//! ## Principles
//!
//! - All functions return `Result<T, ls8_error::Error>`
//! - External errors are wrapped with `set_source(err)`
//! - Same error handled once, subsequent ops only append context
//! - A machine fault is never retried; it ends the run

mod error;
mod kind;

pub use error::Error;
pub use kind::ErrorKind;

/// Result type alias using the LS-8 Error
pub type Result<T> = std::result::Result<T, Error>;
