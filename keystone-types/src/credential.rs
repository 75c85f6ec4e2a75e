//! Stored password credentials.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A salted password hash attached to a user-like entity.
///
/// The salt is generated once per credential and never reused across users
/// or across password changes. Neither field ever holds plaintext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Base64-encoded Argon2id output.
    pub password_hash: String,
    /// Base64-encoded 16-byte salt.
    pub salt: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("password_hash", &"[REDACTED]")
            .field("salt", &self.salt)
            .finish()
    }
}
