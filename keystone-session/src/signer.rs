use crate::error::{SessionError, SessionResult};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use keystone_types::EntityId;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

/// Size of the signing secret in bytes.
pub const SECRET_SIZE: usize = 32;

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// The signed assertion embedded in a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// The authenticated subject.
    pub sub: EntityId,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Issues and validates session tokens under a symmetric secret.
#[derive(Clone)]
pub struct SessionSigner {
    secret: [u8; SECRET_SIZE],
    ttl: Duration,
}

impl fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionSigner")
            .field("secret", &"[REDACTED]")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl SessionSigner {
    /// Creates a signer with the default 7-day lifetime.
    #[must_use]
    pub fn new(secret: [u8; SECRET_SIZE]) -> Self {
        Self {
            secret,
            ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }

    /// Creates a signer with an explicit token lifetime.
    #[must_use]
    pub fn with_ttl(secret: [u8; SECRET_SIZE], ttl: Duration) -> Self {
        Self { secret, ttl }
    }

    /// Creates a signer with a random ephemeral secret.
    ///
    /// Tokens issued under an ephemeral secret do not survive a process
    /// restart.
    #[must_use]
    pub fn from_random() -> Self {
        let mut secret = [0u8; SECRET_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut secret);
        Self::new(secret)
    }

    /// Issues a token for `subject`, expiring `ttl` from now.
    pub fn issue(&self, subject: EntityId) -> SessionResult<String> {
        self.issue_at(subject, Utc::now())
    }

    /// Issues a token as of an explicit instant.
    pub fn issue_at(&self, subject: EntityId, now: DateTime<Utc>) -> SessionResult<String> {
        let claims = SessionClaims {
            sub: subject,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        let payload = serde_json::to_vec(&claims)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        let payload_b64 = URL_SAFE_NO_PAD.encode(payload);
        let sig_b64 = URL_SAFE_NO_PAD.encode(self.sign(payload_b64.as_bytes())?);
        Ok(format!("{payload_b64}.{sig_b64}"))
    }

    /// Validates a token and returns the subject it asserts.
    pub fn validate(&self, token: &str) -> SessionResult<EntityId> {
        self.validate_at(token, Utc::now())
    }

    /// Validates a token as of an explicit instant.
    ///
    /// The signature is checked before the claims are trusted for anything,
    /// expiry included; comparison is constant-time.
    pub fn validate_at(&self, token: &str, now: DateTime<Utc>) -> SessionResult<EntityId> {
        let (payload_b64, sig_b64) = token
            .split_once('.')
            .filter(|(payload, sig)| !payload.is_empty() && !sig.is_empty() && !sig.contains('.'))
            .ok_or_else(|| {
                SessionError::Malformed("token must be two dot-separated parts".into())
            })?;

        let signature = URL_SAFE_NO_PAD
            .decode(sig_b64)
            .map_err(|e| SessionError::Malformed(format!("invalid signature base64: {e}")))?;

        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        mac.update(payload_b64.as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| SessionError::InvalidSignature)?;

        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|e| SessionError::Malformed(format!("invalid payload base64: {e}")))?;
        let claims: SessionClaims = serde_json::from_slice(&payload)
            .map_err(|e| SessionError::Malformed(format!("invalid claims JSON: {e}")))?;

        if now.timestamp() > claims.exp {
            return Err(SessionError::Expired);
        }
        Ok(claims.sub)
    }

    fn sign(&self, data: &[u8]) -> SessionResult<Vec<u8>> {
        let mut mac = HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| SessionError::Serialization(e.to_string()))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }
}
