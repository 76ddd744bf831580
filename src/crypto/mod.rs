//! Cryptographic primitives for Pass Vault.
//!
//! This module provides:
//! - ChaCha20-Poly1305 encryption and decryption (`encryption`)
//! - Argon2id / PBKDF2 password-based key derivation (`kdf`)
//! - The zeroizing session key (`keys`)
//! - The session `Lock` that seals the master token (`lock`)
//! - CSPRNG helpers for passwords, tags and padding (`random`)

pub mod encryption;
pub mod kdf;
pub mod keys;
pub mod lock;
pub mod random;

pub use encryption::{decrypt, encrypt, NONCE_LEN};
pub use kdf::{derive_key, generate_salt, KdfAlgorithm, KEY_LEN, SALT_LEN};
pub use keys::SessionKey;
pub use lock::{Lock, SealedToken};
