//! Error taxonomy shared by the reader, the environment and the evaluator.
//!
//! Structural failures carry a message; `Thrown` carries the Value passed to
//! `throw`. Both travel through the same `Result` so that `try*`/`catch*`
//! can recover either one.

use std::fmt;

use thiserror::Error;

use crate::language::{Value, pr_str};

/// Result type for reading and evaluation.
pub type Result<T> = std::result::Result<T, Error>;

/// Expected argument count for a callable or special form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    AtLeast(usize),
    Range(usize, usize),
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{n}"),
            Arity::AtLeast(n) => write!(f, "at least {n}"),
            Arity::Range(min, max) => write!(f, "{min} to {max}"),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Malformed source text
    #[error("syntax error: {0}")]
    Syntax(String),

    /// The reader found no tokens at all
    #[error("no input")]
    EmptyInput,

    /// Unbound symbol
    #[error("'{0}' not found")]
    NotFound(String),

    /// Wrong number of arguments to a closure, builtin or special form
    #[error("{name}: wrong number of arguments (expected {expected}, got {got})")]
    Arity {
        name: String,
        expected: Arity,
        got: usize,
    },

    /// A value of the wrong shape was used
    #[error("{0}")]
    Type(String),

    /// Host I/O failure (reading a file or a line)
    #[error("{0}")]
    Io(String),

    /// Recursion nested past the per-thread limit
    #[error("maximum recursion depth ({0}) exceeded")]
    DepthExceeded(usize),

    /// Payload raised by `throw`
    #[error("{}", pr_str(.0, false))]
    Thrown(Value),
}

impl Error {
    pub fn syntax(message: impl Into<String>) -> Self {
        Error::Syntax(message.into())
    }

    pub fn type_error(message: impl Into<String>) -> Self {
        Error::Type(message.into())
    }

    pub fn arity(name: impl Into<String>, expected: Arity, got: usize) -> Self {
        Error::Arity {
            name: name.into(),
            expected,
            got,
        }
    }

    /// The value a `catch*` clause binds for this failure.
    ///
    /// A thrown value comes back unchanged; structural errors become their
    /// message as a string.
    pub fn payload(&self) -> Value {
        match self {
            Error::Thrown(value) => value.clone(),
            other => Value::string(other.to_string()),
        }
    }

    pub fn is_thrown(&self) -> bool {
        matches!(self, Error::Thrown(_))
    }
}

/// Check `args` against an exact count, returning an ArityError otherwise.
pub fn check_arity_exact<T>(name: &str, args: &[T], expected: usize) -> Result<()> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(Error::arity(name, Arity::Exact(expected), args.len()))
    }
}

/// Check `args` against a minimum count.
pub fn check_arity_min<T>(name: &str, args: &[T], min: usize) -> Result<()> {
    if args.len() >= min {
        Ok(())
    } else {
        Err(Error::arity(name, Arity::AtLeast(min), args.len()))
    }
}

/// Check `args` against an inclusive range.
pub fn check_arity_range<T>(name: &str, args: &[T], min: usize, max: usize) -> Result<()> {
    if (min..=max).contains(&args.len()) {
        Ok(())
    } else {
        Err(Error::arity(name, Arity::Range(min, max), args.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_message() {
        let err = Error::arity("+", Arity::Exact(2), 3);
        assert_eq!(
            err.to_string(),
            "+: wrong number of arguments (expected 2, got 3)"
        );
    }

    #[test]
    fn test_thrown_message_is_unreadable_rendering() {
        let err = Error::Thrown(Value::string("oops"));
        assert_eq!(err.to_string(), "oops");
    }

    #[test]
    fn test_payload_of_structural_error_is_message() {
        let err = Error::NotFound("abc".to_string());
        let payload = err.payload();
        assert_eq!(pr_str(&payload, true), "\"'abc' not found\"");
    }

    #[test]
    fn test_check_arity_helpers() {
        let args = [1, 2];
        assert!(check_arity_exact("f", &args, 2).is_ok());
        assert!(check_arity_exact("f", &args, 1).is_err());
        assert!(check_arity_min("f", &args, 1).is_ok());
        assert!(check_arity_min("f", &args, 3).is_err());
        assert!(check_arity_range("f", &args, 2, 3).is_ok());
        assert!(check_arity_range("f", &args, 3, 4).is_err());
    }
}
