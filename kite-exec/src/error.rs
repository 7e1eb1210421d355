//! Runtime errors for the executor.

use std::io;

use kite_parser::ast::BinOp;
use thiserror::Error;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// An error that stops a running program.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Integer division or remainder by zero
    #[error("Division by zero in '{op}' operation")]
    DivisionByZero { op: BinOp },

    /// Result does not fit in a 32 bit signed integer
    #[error("Integer overflow in '{op}' operation")]
    IntegerOverflow { op: BinOp },

    /// A non-void function reached the end of its body while its value was used
    #[error("Function '{function}' finished without returning a value")]
    MissingReturnValue { function: String },

    /// Method call or property read through an object variable that was never constructed
    #[error("Variable '{object}' does not reference an object")]
    NullReference { object: String },

    /// Program output could not be written
    #[error("Unable to write program output")]
    Io(#[from] io::Error),

    /// The program does not match what the validator guarantees
    #[error("Internal error: {0}")]
    Internal(String),
}
