use crate::error::{CredentialError, CredentialResult};
use crate::salt::Salt;
use argon2::{Argon2, Params, Version};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use keystone_types::Credential;
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

/// Size of the hash output in bytes.
pub const HASH_SIZE: usize = 32;

/// Key-stretching parameters.
#[derive(Clone, Debug)]
pub struct KdfParams {
    /// Memory cost in KiB.
    pub memory_cost: u32,
    /// Time cost (iterations).
    pub time_cost: u32,
    /// Parallelism factor.
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // OWASP recommendations for Argon2id (2023): interactive cost on
        // modern hardware, far above any fast general-purpose hash.
        Self {
            memory_cost: 19 * 1024, // 19 MiB
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Fast, insecure tuning for test suites only.
    #[must_use]
    pub fn fast_insecure() -> Self {
        Self {
            memory_cost: 1024, // 1 MiB
            time_cost: 1,
            parallelism: 1,
        }
    }
}

/// Hashes and verifies password credentials.
///
/// Pure CPU-bound component, no I/O. The same parameter set must be used
/// for hashing and verification of a given credential.
#[derive(Clone, Debug)]
pub struct CredentialManager {
    params: KdfParams,
}

impl CredentialManager {
    /// Creates a manager with explicit parameters.
    #[must_use]
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    /// Creates a manager with the default production parameters.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(KdfParams::default())
    }

    /// Generates a fresh random salt.
    #[must_use]
    pub fn generate_salt() -> Salt {
        Salt::random()
    }

    /// Hashes a password under a freshly generated salt.
    ///
    /// Every call draws a new salt; the old salt of a credential being
    /// replaced is never reused.
    pub fn hash(&self, password: &str) -> CredentialResult<Credential> {
        let salt = Salt::random();
        self.hash_with_salt(password, &salt)
    }

    /// Hashes a password under a caller-provided salt.
    pub fn hash_with_salt(&self, password: &str, salt: &Salt) -> CredentialResult<Credential> {
        let mut output = self.derive(password, salt.as_bytes())?;
        let credential = Credential {
            password_hash: STANDARD.encode(output),
            salt: salt.to_base64(),
        };
        output.zeroize();
        Ok(credential)
    }

    /// Recomputes the hash for `password` and compares in constant time.
    ///
    /// Malformed stored credentials (bad base64, wrong lengths) verify as
    /// false rather than erroring; a tampered record is just a mismatch.
    #[must_use]
    pub fn verify(&self, password: &str, credential: &Credential) -> bool {
        let Some(salt) = Salt::from_base64(&credential.salt) else {
            return false;
        };
        let Ok(stored) = STANDARD.decode(&credential.password_hash) else {
            return false;
        };
        let Ok(mut candidate) = self.derive(password, salt.as_bytes()) else {
            return false;
        };
        let matches = bool::from(candidate.as_slice().ct_eq(stored.as_slice()));
        candidate.zeroize();
        matches
    }

    /// Burns a full derivation against a fixed credential and returns false.
    ///
    /// Callers must invoke this when the user record does not exist, so
    /// "unknown user" and "wrong password" cost the same and neither is
    /// observable through timing.
    #[must_use]
    pub fn verify_dummy(&self, password: &str) -> bool {
        let dummy = Credential {
            password_hash: STANDARD.encode([0u8; HASH_SIZE]),
            salt: Salt::from_bytes(*b"keystone.dummy.s").to_base64(),
        };
        let _ = self.verify(password, &dummy);
        false
    }

    fn derive(&self, password: &str, salt: &[u8]) -> CredentialResult<[u8; HASH_SIZE]> {
        let params = Params::new(
            self.params.memory_cost,
            self.params.time_cost,
            self.params.parallelism,
            Some(HASH_SIZE),
        )
        .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        let argon2 = Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params);

        let mut output = [0u8; HASH_SIZE];
        argon2
            .hash_password_into(password.as_bytes(), salt, &mut output)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;
        Ok(output)
    }
}
