//! Lifecycle token issuance and redemption.
//!
//! A lifecycle token is a single-use, time-bounded secret that authorizes
//! one follow-up action: verifying an email address or resetting a password.
//! The manager generates unguessable values, persists the records through a
//! [`keystone_store::TokenStore`], and redeems them at most once each.
//!
//! The raw value is returned only to the issuer (who delivers it over a side
//! channel); it is never derivable from the store by re-query.

mod error;
mod manager;

pub use error::{TokenError, TokenResult};
pub use manager::{TokenLifecycleManager, TokenTtls, TOKEN_VALUE_SIZE};
