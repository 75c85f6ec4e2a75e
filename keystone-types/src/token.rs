//! Single-use lifecycle tokens.
//!
//! A lifecycle token authorizes one specific follow-up action (verifying an
//! email address, resetting a password). Its state machine is
//! `Issued -> Consumed` (terminal) or expiry by clock comparison; there are
//! no other transitions.

use crate::EntityId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a lifecycle token is allowed to be redeemed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenPurpose {
    /// Proves ownership of the email address given at registration.
    EmailVerification,
    /// Authorizes setting a new password without knowing the old one.
    PasswordReset,
}

/// A stored single-use token bound to a subject and a purpose.
///
/// The `value` is the raw secret handed to the holder over a side channel
/// (email); the store keeps it only to match redemption attempts. A token
/// that is consumed or past `expires_at` is never accepted again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleToken {
    /// Opaque random value presented by the holder at redemption.
    pub value: String,
    /// The single action this token authorizes.
    pub purpose: TokenPurpose,
    /// The entity this token is bound to.
    pub subject: EntityId,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// After this instant the token is dead regardless of consumption.
    pub expires_at: DateTime<Utc>,
    /// Set exactly once, on successful redemption.
    pub consumed: bool,
}

impl LifecycleToken {
    /// Returns true if the token is past its expiry at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }

    /// Returns true if the token can still be redeemed at `now`.
    #[must_use]
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        !self.consumed && !self.is_expired(now)
    }
}
