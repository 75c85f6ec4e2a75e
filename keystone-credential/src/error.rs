//! Error types for credential management.

use thiserror::Error;

/// Result type for credential operations.
pub type CredentialResult<T> = Result<T, CredentialError>;

/// Errors that can occur while hashing a password.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// Key-stretching failed (bad parameters).
    #[error("password hashing failed: {0}")]
    Hashing(String),
}
