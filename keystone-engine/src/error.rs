//! Error types for the command engine.

use keystone_model::ValidationError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced to the engine's callers.
///
/// Credential and token failures carry deliberately flat messages: "wrong
/// password" vs "unknown user" and "wrong token" vs "expired token" are not
/// distinguishable from the outside. The distinct causes are logged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Unknown entity type or missing id.
    #[error("not found: {0}")]
    NotFound(String),

    /// A command token or attribute value was rejected.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Account input rejected before any store access (length bounds,
    /// malformed email).
    #[error("{0}")]
    InvalidInput(String),

    /// A uniqueness rule was violated (duplicate username).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Lifecycle token rejected; cause intentionally unspecified.
    #[error("token is invalid or expired")]
    InvalidOrExpired,

    /// Authentication failed; cause intentionally unspecified.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Store-level failure. The cause is logged, never surfaced.
    #[error("persistence failure")]
    Persistence,
}
