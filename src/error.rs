//! Error types for the inventory.
//!
//! Expected outcomes are not errors here: removing an unknown label yields
//! `None`, and an empty inventory simply has no next expiration. The variants
//! below cover rejected input, a missing runtime, and broken invariants.

use thiserror::Error;

/// Errors surfaced by inventory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    /// The caller handed over an item that cannot be tracked
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The production timer needs a Tokio runtime to spawn its wake-up task
    #[error("no Tokio runtime available to drive expiry wake-ups")]
    RuntimeUnavailable,

    /// The item store, expiration index and scheduler disagree
    #[error("internal inconsistency: {0}")]
    InternalInconsistency(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, InventoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = InventoryError::InvalidArgument("item label is empty".to_string());
        assert_eq!(err.to_string(), "invalid argument: item label is empty");

        let err = InventoryError::InternalInconsistency("index has 2 entries, store has 1".into());
        assert!(err.to_string().starts_with("internal inconsistency"));
    }
}
