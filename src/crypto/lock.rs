//! The session `Lock`: a derived key plus the salt it came from.
//!
//! A `Lock` is built once per unlocked session from the master password
//! and the store's salt. Every value that crosses the wire (entry names,
//! entry payloads, the sealed master token) is an AEAD ciphertext under
//! this one key. There is no stored password hash: successfully opening
//! the sealed master token is the only proof that the password is right.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use zeroize::{Zeroize, Zeroizing};

use super::encryption::{decrypt, encrypt};
use super::kdf::{derive_key, generate_salt, KdfAlgorithm, SALT_LEN};
use super::keys::SessionKey;
use crate::errors::{PassError, Result};

/// Hex-encoded master token ciphertext together with the salt that was
/// used to derive its key. This is what the configuration persists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedToken {
    pub token: String,
    pub salt: String,
}

/// Session key material. Read-only once constructed, except through
/// `lock_token`, which re-salts the lock at store-creation time.
pub struct Lock {
    key: SessionKey,
    salt: [u8; SALT_LEN],
    kdf: KdfAlgorithm,
}

impl Lock {
    /// Derive the session key from `password` and a 32-byte `salt`.
    ///
    /// This is deliberately slow: the KDF cost is what makes offline
    /// guessing expensive.
    pub fn new(password: &[u8], salt: &[u8], kdf: KdfAlgorithm) -> Result<Self> {
        let mut key_bytes = derive_key(password, salt, kdf)?;
        let key = SessionKey::new(key_bytes);
        key_bytes.zeroize();

        let mut fixed_salt = [0u8; SALT_LEN];
        fixed_salt.copy_from_slice(salt);

        Ok(Self {
            key,
            salt: fixed_salt,
            kdf,
        })
    }

    /// Like `new`, with the salt given as the hex string stored in config.
    pub fn from_hex_salt(password: &[u8], hex_salt: &str, kdf: KdfAlgorithm) -> Result<Self> {
        let salt = hex::decode(hex_salt)
            .map_err(|e| PassError::KeyDerivationFailed(format!("salt is not valid hex: {e}")))?;
        Self::new(password, &salt, kdf)
    }

    /// Build a lock for a brand-new store under a freshly generated salt.
    pub fn create(password: &[u8], kdf: KdfAlgorithm) -> Result<Self> {
        Self::new(password, &generate_salt(), kdf)
    }

    /// Seal `token` under the current key and salt.
    pub fn seal_token(&self, token: &str) -> Result<SealedToken> {
        Ok(SealedToken {
            token: self.encrypt_and_encode_hex(token)?,
            salt: hex::encode(self.salt),
        })
    }

    /// Generate a new salt, re-derive the key from `password` and seal
    /// `token` under it.
    ///
    /// Only used when a store is created or reconfigured: every entry
    /// already on the server stays bound to the old key.  On failure the
    /// lock keeps its previous key and salt.
    pub fn lock_token(&mut self, password: &[u8], token: &str) -> Result<SealedToken> {
        let fresh = Self::new(password, &generate_salt(), self.kdf)?;
        *self = fresh;
        self.seal_token(token)
    }

    /// Open the sealed master token.
    ///
    /// Fails with `DecryptionFailed` when the password (and therefore the
    /// key) is wrong or the ciphertext was tampered with. The lock itself
    /// is never modified, so callers can simply re-prompt and retry.
    pub fn unlock_token(&self, hex_token: &str) -> Result<Zeroizing<String>> {
        self.hex_decode_and_decrypt(hex_token).map(Zeroizing::new)
    }

    // ------------------------------------------------------------------
    // Encode/decode wrappers
    // ------------------------------------------------------------------

    /// Encrypt `plaintext` and hex-encode the `nonce || ciphertext` blob.
    pub fn encrypt_and_encode_hex(&self, plaintext: &str) -> Result<String> {
        let ciphertext = encrypt(self.key.as_bytes(), plaintext.as_bytes())?;
        Ok(hex::encode(ciphertext))
    }

    /// Reverse of `encrypt_and_encode_hex`. Bad hex fails closed.
    pub fn hex_decode_and_decrypt(&self, hex_ciphertext: &str) -> Result<String> {
        let ciphertext = hex::decode(hex_ciphertext).map_err(|_| PassError::DecryptionFailed)?;
        let plaintext = decrypt(self.key.as_bytes(), &ciphertext)?;
        into_utf8(plaintext)
    }

    /// Encrypt `plaintext` and base64-encode the `nonce || ciphertext` blob.
    pub fn encrypt_and_encode_base64(&self, plaintext: &[u8]) -> Result<String> {
        let ciphertext = encrypt(self.key.as_bytes(), plaintext)?;
        Ok(BASE64.encode(ciphertext))
    }

    /// Reverse of `encrypt_and_encode_base64`. Bad base64 fails closed.
    pub fn base64_decode_and_decrypt(&self, b64_ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let ciphertext = BASE64
            .decode(b64_ciphertext)
            .map_err(|_| PassError::DecryptionFailed)?;
        decrypt(self.key.as_bytes(), &ciphertext).map(Zeroizing::new)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The session key derived at construction.
    pub fn key(&self) -> &SessionKey {
        &self.key
    }

    /// The raw salt the key was derived with.
    pub fn salt(&self) -> &[u8; SALT_LEN] {
        &self.salt
    }

    /// The key derivation algorithm this lock was built with.
    pub fn kdf(&self) -> KdfAlgorithm {
        self.kdf
    }
}

impl fmt::Debug for Lock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lock")
            .field("key", &self.key)
            .field("salt", &hex::encode(self.salt))
            .field("kdf", &self.kdf)
            .finish()
    }
}

/// Convert decrypted bytes to a `String`, wiping them if they are not UTF-8.
fn into_utf8(plaintext: Vec<u8>) -> Result<String> {
    String::from_utf8(plaintext).map_err(|e| {
        let mut bad_bytes = e.into_bytes();
        bad_bytes.zeroize();
        PassError::DecryptionFailed
    })
}
