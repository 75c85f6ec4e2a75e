//! Error types for token lifecycle operations.

use keystone_store::StoreError;
use thiserror::Error;

/// Result type for token lifecycle operations.
pub type TokenResult<T> = Result<T, TokenError>;

/// Errors that can occur while issuing or redeeming lifecycle tokens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// The presented value is unknown, already consumed, expired, or bound
    /// to a different purpose. Deliberately one variant: callers must not be
    /// able to distinguish the cases.
    #[error("token is invalid or expired")]
    InvalidOrExpired,

    /// The token store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}
