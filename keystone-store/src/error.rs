//! Error types for the persistence layer.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
///
/// Backend causes stay opaque here; callers surface them as a generic
/// persistence failure without leaking internals.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The addressed record does not exist.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A uniqueness constraint was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Backend-level failure, cause opaque to callers.
    #[error("storage backend error: {0}")]
    Backend(String),
}
