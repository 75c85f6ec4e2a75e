//! Password credential management.
//!
//! Uses Argon2id with an explicit per-credential salt for hashing and
//! constant-time comparison for verification. Hashing is deliberately slow;
//! callers on an async runtime should run it where blocking is acceptable
//! (`tokio::task::spawn_blocking`).

mod error;
mod manager;
mod salt;

pub use error::{CredentialError, CredentialResult};
pub use manager::{CredentialManager, KdfParams, HASH_SIZE};
pub use salt::{Salt, SALT_SIZE};
