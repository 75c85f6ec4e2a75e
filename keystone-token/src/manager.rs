use crate::error::{TokenError, TokenResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use keystone_store::TokenStore;
use keystone_types::{EntityId, LifecycleToken, TokenPurpose};
use rand::RngCore;
use std::sync::Arc;
use tracing::debug;

/// Size of raw token values in bytes before encoding.
pub const TOKEN_VALUE_SIZE: usize = 32;

/// Per-purpose token lifetimes.
#[derive(Clone, Debug)]
pub struct TokenTtls {
    pub email_verification: Duration,
    pub password_reset: Duration,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            email_verification: Duration::hours(24),
            password_reset: Duration::hours(1),
        }
    }
}

impl TokenTtls {
    fn for_purpose(&self, purpose: TokenPurpose) -> Duration {
        match purpose {
            TokenPurpose::EmailVerification => self.email_verification,
            TokenPurpose::PasswordReset => self.password_reset,
        }
    }
}

/// Issues and redeems single-use lifecycle tokens.
pub struct TokenLifecycleManager {
    store: Arc<dyn TokenStore>,
    ttls: TokenTtls,
}

impl TokenLifecycleManager {
    /// Creates a manager with the default per-purpose lifetimes.
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self::with_ttls(store, TokenTtls::default())
    }

    /// Creates a manager with explicit lifetimes.
    pub fn with_ttls(store: Arc<dyn TokenStore>, ttls: TokenTtls) -> Self {
        Self { store, ttls }
    }

    /// Issues a token for `subject` and returns the raw value.
    ///
    /// Issuing drops any outstanding live token for the same subject and
    /// purpose, so exactly one value can ever redeem per pair.
    pub async fn issue(&self, purpose: TokenPurpose, subject: EntityId) -> TokenResult<String> {
        let now = Utc::now();
        let value = random_value();
        let token = LifecycleToken {
            value: value.clone(),
            purpose,
            subject,
            issued_at: now,
            expires_at: now + self.ttls.for_purpose(purpose),
            consumed: false,
        };
        self.store.put(token).await?;
        debug!(?purpose, %subject, "issued lifecycle token");
        Ok(value)
    }

    /// Redeems a token, marking it consumed.
    pub async fn consume(&self, raw: &str, purpose: TokenPurpose) -> TokenResult<EntityId> {
        self.consume_at(raw, purpose, Utc::now()).await
    }

    /// Redeems a token as of an explicit instant.
    ///
    /// Unknown, consumed, expired, and wrong-purpose values all fail with
    /// the same error; the rejection is logged without the presented value.
    pub async fn consume_at(
        &self,
        raw: &str,
        purpose: TokenPurpose,
        now: DateTime<Utc>,
    ) -> TokenResult<EntityId> {
        match self.store.consume(raw, purpose, now).await? {
            Some(subject) => {
                debug!(?purpose, %subject, "consumed lifecycle token");
                Ok(subject)
            }
            None => {
                debug!(?purpose, "rejected lifecycle token redemption");
                Err(TokenError::InvalidOrExpired)
            }
        }
    }
}

fn random_value() -> String {
    let mut bytes = [0u8; TOKEN_VALUE_SIZE];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
