//! Error types for the solution harness
//!
//! Every error is terminal for the single test case that raised it. Messages
//! carry enough context (operation, argument index, attempted shape) to
//! diagnose a failing case without re-running it.

use std::io;
use thiserror::Error;

use crate::shape::Shape;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed error raised by an operation under test
pub type SubjectError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Resolution Errors ===
    #[error("Operation '{name}' not found on {subject}")]
    OperationNotFound { name: String, subject: String },

    #[error("No current test: the running thread carries no test name")]
    NoCurrentTest,

    // === Binding Errors ===
    #[error("Operation '{operation}' takes {expected} argument(s) but {supplied} were supplied")]
    ArgumentCount {
        operation: String,
        expected: usize,
        supplied: usize,
    },

    #[error("Argument {index} does not fit parameter type {shape}: {reason}")]
    ArgumentType {
        index: usize,
        shape: Shape,
        reason: String,
    },

    // === Materialization Errors ===
    #[error("Bad argument {index}: cannot materialize as {shape}: {reason}")]
    BadArgument {
        index: usize,
        shape: Shape,
        reason: String,
    },

    #[error("Cannot coerce expected value to {shape}: {reason}")]
    BadExpected { shape: Shape, reason: String },

    // === Subject Errors ===
    /// Raised by the operation under test; surfaced verbatim
    #[error(transparent)]
    Subject(SubjectError),

    #[error("Failed to encode result of '{operation}': {error}")]
    ResultEncoding {
        operation: String,
        #[source]
        error: serde_json::Error,
    },

    // === Path Errors ===
    #[error("No project root found above '{start}' (looked for {markers})")]
    ProjectRootNotFound { start: String, markers: String },

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Invalid case file: {0}")]
    CaseFile(String),

    // === IO Errors ===
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },
}

impl Error {
    /// Create an operation not found error
    pub fn operation_not_found(name: &str, subject: &str) -> Self {
        Self::OperationNotFound {
            name: name.to_string(),
            subject: subject.to_string(),
        }
    }

    /// Create a bad argument error for the argument at `index`
    pub fn bad_argument(index: usize, shape: &Shape, reason: impl ToString) -> Self {
        Self::BadArgument {
            index,
            shape: shape.clone(),
            reason: reason.to_string(),
        }
    }

    /// Create an argument type error for the argument at `index`
    pub fn argument_type(index: usize, shape: &Shape, reason: impl ToString) -> Self {
        Self::ArgumentType {
            index,
            shape: shape.clone(),
            reason: reason.to_string(),
        }
    }

    /// Create a bad expected value error
    pub fn bad_expected(shape: &Shape, reason: impl ToString) -> Self {
        Self::BadExpected {
            shape: shape.clone(),
            reason: reason.to_string(),
        }
    }

    /// Wrap an error raised by the operation under test
    pub fn subject<E>(error: E) -> Self
    where
        E: Into<SubjectError>,
    {
        Self::Subject(error.into())
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: &io::Error) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error came from the operation under test rather than the harness
    pub fn is_subject_failure(&self) -> bool {
        matches!(self, Self::Subject(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bad_argument_names_index_and_shape() {
        let err = Error::bad_argument(1, &Shape::array(Shape::Int), "expected value");
        let msg = err.to_string();
        assert!(msg.contains("argument 1"));
        assert!(msg.contains("int[]"));
    }

    #[test]
    fn test_subject_error_is_transparent() {
        let inner = io::Error::new(io::ErrorKind::Other, "division by zero");
        let err = Error::subject(inner);
        assert!(err.is_subject_failure());
        assert_eq!(err.to_string(), "division by zero");
    }
}
