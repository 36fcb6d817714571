//! Runtime system
//!
//! Values, the tree-walking interpreter that executes compiled lines, and the
//! output channel a running line writes to.

use thiserror::Error;

pub mod interpreter;
pub mod output;
pub mod value;

pub use interpreter::Interpreter;
pub use output::{BufferLogger, ConsoleLogger, EvaluationLogger, NullLogger};
pub use value::Value;

/// Longest string, in bytes, a running line may build
pub const MAX_STRING_LENGTH: usize = 1 << 24;

/// Failure while executing a line that compiled cleanly
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("Attempted to divide by zero.")]
    DivideByZero,

    #[error("Arithmetic operation resulted in an overflow.")]
    Overflow,

    #[error("{0}")]
    Format(String),

    #[error("Specified argument was out of the range of valid values. (Parameter '{0}')")]
    ArgumentOutOfRange(&'static str),

    #[error("String length exceeds the limit of {0} bytes")]
    StringTooLong(usize),

    #[error("Execution exceeded the budget of {0} steps")]
    StepBudgetExceeded(u64),

    #[error("The name '{0}' is not defined at run time")]
    Unbound(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl RuntimeError {
    pub(crate) fn format() -> Self {
        RuntimeError::Format("The input string was not in a correct format.".to_string())
    }
}

#[cfg(test)]
mod tests;
