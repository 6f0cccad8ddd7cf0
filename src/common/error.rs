//! Error types for slotdb.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors raised by the index.
///
/// Errors fall into two families:
/// - **Invalid argument**: the caller passed something the index rejects.
///   Nothing was mutated and the caller can simply fix the input.
/// - **Invariant violation**: the tree found itself in a shape it should
///   never be in. This is a bug or corruption and is fatal to the
///   operation that hit it. The tree lock is still released.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Tree order below the supported minimum.
    #[error("invalid order {order}: must be at least {min}")]
    InvalidOrder { order: usize, min: usize },

    /// Range query with `start > end`.
    #[error("invalid range: start key is greater than end key")]
    InvalidRange,

    /// Structural corruption detected inside the tree.
    ///
    /// Examples: a handle pointing at a freed node, a leaf where an internal
    /// node was expected, a parent that does not list its child.
    #[error("B+ tree invariant violated: {0}")]
    InvariantViolation(String),
}

impl Error {
    /// Shorthand used by the tree internals.
    pub(crate) fn invariant(msg: impl Into<String>) -> Self {
        Error::InvariantViolation(msg.into())
    }

    /// True for errors caused by caller input.
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidOrder { .. } | Error::InvalidRange)
    }

    /// True for errors caused by structural corruption.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Error::InvariantViolation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidOrder { order: 2, min: 3 };
        assert_eq!(format!("{}", err), "invalid order 2: must be at least 3");

        let err = Error::invariant("missing parent");
        assert_eq!(
            format!("{}", err),
            "B+ tree invariant violated: missing parent"
        );
    }

    #[test]
    fn test_error_classification() {
        assert!(Error::InvalidRange.is_invalid_argument());
        assert!(!Error::InvalidRange.is_invariant_violation());

        let err = Error::invariant("bad");
        assert!(err.is_invariant_violation());
        assert!(!err.is_invalid_argument());
    }

    #[test]
    fn test_result_type_alias() {
        fn might_fail() -> Result<u32> {
            Ok(42)
        }

        assert_eq!(might_fail().unwrap(), 42);
    }
}
