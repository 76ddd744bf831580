//! Password-based key derivation.
//!
//! Two algorithms are supported. Argon2id is the default for new stores;
//! PBKDF2-HMAC-SHA256 exists for stores created before Argon2 was adopted.
//! The algorithm is part of a store's format: it is recorded in the
//! configuration next to the salt and never chosen per process.

use std::fmt;

use argon2::{Algorithm, Argon2, Params, Version};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::errors::{PassError, Result};

/// Length of the salt in bytes (256 bits).
pub const SALT_LEN: usize = 32;

/// Length of the derived key in bytes (256 bits, for ChaCha20-Poly1305).
pub const KEY_LEN: usize = 32;

/// Argon2id time cost (iterations).
const ARGON2_TIME: u32 = 4;

/// Argon2id memory cost in KiB (32 MiB).
const ARGON2_MEMORY_KIB: u32 = 32 * 1024;

/// Argon2id parallelism lanes.
const ARGON2_LANES: u32 = 4;

/// PBKDF2 iteration count used by legacy stores.
const PBKDF2_ITERATIONS: u32 = 4096;

/// Key derivation algorithm pinned by a store's configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum KdfAlgorithm {
    /// Argon2id, t=4, m=32 MiB, p=4.
    #[default]
    #[serde(rename = "argon2id")]
    Argon2id,
    /// PBKDF2-HMAC-SHA256 with 4096 iterations.
    #[serde(rename = "pbkdf2-sha256")]
    Pbkdf2Sha256,
}

impl fmt::Display for KdfAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Argon2id => f.write_str("argon2id"),
            Self::Pbkdf2Sha256 => f.write_str("pbkdf2-sha256"),
        }
    }
}

impl std::str::FromStr for KdfAlgorithm {
    type Err = PassError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "argon2id" | "argon2" => Ok(Self::Argon2id),
            "pbkdf2-sha256" | "pbkdf2" => Ok(Self::Pbkdf2Sha256),
            other => Err(PassError::ConfigError(format!(
                "unknown key derivation algorithm '{other}' (expected argon2id or pbkdf2-sha256)"
            ))),
        }
    }
}

/// Derive a 32-byte key from a password and a 32-byte salt.
///
/// The same password + salt + algorithm always produce the same key.
pub fn derive_key(password: &[u8], salt: &[u8], algorithm: KdfAlgorithm) -> Result<[u8; KEY_LEN]> {
    if salt.len() != SALT_LEN {
        return Err(PassError::KeyDerivationFailed(format!(
            "salt must be exactly {SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }

    let mut key = [0u8; KEY_LEN];

    match algorithm {
        KdfAlgorithm::Argon2id => {
            let params = Params::new(ARGON2_MEMORY_KIB, ARGON2_TIME, ARGON2_LANES, Some(KEY_LEN))
                .map_err(|e| {
                    PassError::KeyDerivationFailed(format!("invalid Argon2 params: {e}"))
                })?;

            Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
                .hash_password_into(password, salt, &mut key)
                .map_err(|e| {
                    PassError::KeyDerivationFailed(format!("Argon2id hashing failed: {e}"))
                })?;
        }
        KdfAlgorithm::Pbkdf2Sha256 => {
            pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, PBKDF2_ITERATIONS, &mut key);
        }
    }

    Ok(key)
}

/// Generate a cryptographically random 32-byte salt.
pub fn generate_salt() -> [u8; SALT_LEN] {
    let mut salt = [0u8; SALT_LEN];
    rand::rng().fill_bytes(&mut salt);
    salt
}
