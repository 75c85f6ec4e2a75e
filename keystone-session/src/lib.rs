//! Stateless bearer session tokens.
//!
//! Tokens use the format `base64url(claims JSON).base64url(signature)`,
//! where the signature is HMAC-SHA256 over the encoded claims string under a
//! process-wide secret. Validity is recomputed from the signature and the
//! embedded expiry alone — no store lookup, no revocation list.
//!
//! Tampering with the subject or expiry invalidates the signature;
//! signatures are checked in constant time.

mod error;
mod signer;

pub use error::{SessionError, SessionResult};
pub use signer::{SessionClaims, SessionSigner, DEFAULT_SESSION_TTL_SECS, SECRET_SIZE};
