//! # Error Types
//!
//! This module defines the error taxonomy of the breeding solver.
//!
//! Only two kinds of failure ever reach a caller of [`crate::solver::Solver`]:
//! configuration problems detected before the search starts, and internal
//! invariant violations that cannot be recovered from. Everything that happens
//! per pair or per permutation (missing breeding rules, zero probabilities,
//! exhausted budgets) is absorbed by skipping that unit of work. Cancellation
//! is not an error at all; it is reported through
//! [`crate::solver::SolveOutcome::cancelled`].
//!
//! ## Examples
//!
//! Using the `Result` type:
//!
//! ```rust
//! use breedpath::error::{BreedingError, Result};
//!
//! fn validate(required: usize, capacity: usize) -> Result<()> {
//!     if required > capacity {
//!         return Err(BreedingError::Configuration(format!(
//!             "{} required skills exceed capacity {}",
//!             required, capacity
//!         )));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate(5, 4).is_err());
//! ```
//!
//! Using the `OptionExt` trait to turn a catalog lookup into a `Result`:
//!
//! ```rust
//! use breedpath::error::{BreedingError, OptionExt};
//!
//! fn first_child(children: &[u32]) -> breedpath::error::Result<u32> {
//!     children.first().copied().ok_or_else_breeding(|| {
//!         BreedingError::MissingRule("no breeding result".to_string())
//!     })
//! }
//!
//! assert!(first_child(&[]).is_err());
//! ```

use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Errors surfaced by the breeding solver.
#[derive(Error, Debug)]
pub enum BreedingError {
    /// The target or the solver settings are inconsistent. Raised before any
    /// search work begins.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// An internal contract was broken. This is a defect, not a user error.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// A catalog lookup found no entry (unknown species, no breeding rule).
    #[error("Missing catalog entry: {0}")]
    MissingRule(String),

    /// The worker pool could not be created.
    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    /// Error that occurs when an I/O operation fails.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings or catalog data could not be (de)serialized.
    #[cfg(feature = "serde")]
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A generic error with a custom message.
    #[error("{0}")]
    Other(String),
}

/// A specialized Result type for solver operations.
pub type Result<T> = std::result::Result<T, BreedingError>;

/// Extension trait for Result to add context to errors.
///
/// ## Examples
///
/// ```rust
/// use breedpath::error::ResultExt;
/// use std::fs::File;
///
/// fn open_settings(path: &str) -> breedpath::error::Result<()> {
///     File::open(path).context("Failed to open settings file")?;
///     Ok(())
/// }
///
/// assert!(open_settings("/definitely/not/here.json").is_err());
/// ```
pub trait ResultExt<T, E> {
    /// Converts the error to a `BreedingError::Other` prefixed with `context`.
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| BreedingError::Other(format!("{}: {}", context, e)))
    }
}

/// Extension trait for Option to convert to Result with a custom error.
pub trait OptionExt<T> {
    /// Converts an `Option<T>` to a `Result<T, BreedingError>` using a closure
    /// to generate the error.
    fn ok_or_else_breeding<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> BreedingError;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_else_breeding<F>(self, err_fn: F) -> Result<T>
    where
        F: FnOnce() -> BreedingError,
    {
        self.ok_or_else(err_fn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_prefixes_message() {
        let err: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        let err = err.context("loading settings").unwrap_err();
        assert_eq!(err.to_string(), "loading settings: gone");
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        match missing.ok_or_else_breeding(|| BreedingError::MissingRule("x".into())) {
            Err(BreedingError::MissingRule(msg)) => assert_eq!(msg, "x"),
            other => panic!("Expected MissingRule error, got {:?}", other),
        }
        assert_eq!(Some(3).ok_or_else_breeding(|| BreedingError::Other("no".into())).unwrap(), 3);
    }

    #[test]
    fn test_io_conversion() {
        fn read() -> Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "disk"))?;
            Ok(())
        }
        assert!(matches!(read(), Err(BreedingError::Io(_))));
    }
}
