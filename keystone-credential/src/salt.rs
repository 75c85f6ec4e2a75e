use base64::{engine::general_purpose::STANDARD, Engine as _};
use rand::RngCore;

/// Size of salts in bytes (128 bits).
pub const SALT_SIZE: usize = 16;

/// A per-credential salt.
///
/// Generated once per credential, never reused across users or across
/// password changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Salt {
    bytes: [u8; SALT_SIZE],
}

impl Salt {
    /// Generates a cryptographically random salt.
    #[must_use]
    pub fn random() -> Self {
        let mut bytes = [0u8; SALT_SIZE];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        Self { bytes }
    }

    /// Creates a salt from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; SALT_SIZE]) -> Self {
        Self { bytes }
    }

    /// Decodes a salt from its stored base64 form.
    #[must_use]
    pub fn from_base64(encoded: &str) -> Option<Self> {
        let decoded = STANDARD.decode(encoded).ok()?;
        let bytes: [u8; SALT_SIZE] = decoded.try_into().ok()?;
        Some(Self { bytes })
    }

    /// Returns the salt bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; SALT_SIZE] {
        &self.bytes
    }

    /// Encodes the salt for storage.
    #[must_use]
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.bytes)
    }
}
