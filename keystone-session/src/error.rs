//! Error types for session token handling.
//!
//! The variants are for internal logging and tests; callers facing untrusted
//! clients collapse all of them into one indistinguishable failure.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors that can occur while issuing or validating a session token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The token is not two dot-separated base64url parts, or the claims
    /// payload is not valid JSON.
    #[error("malformed session token: {0}")]
    Malformed(String),

    /// The signature does not match the claims under the current secret.
    #[error("session signature mismatch")]
    InvalidSignature,

    /// The token is past its embedded expiry.
    #[error("session expired")]
    Expired,

    /// Claims could not be serialized at issue time.
    #[error("claims serialization failed: {0}")]
    Serialization(String),
}
