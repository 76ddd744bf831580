use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in the Pass Vault client.
#[derive(Debug, Error)]
pub enum PassError {
    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — wrong password or corrupted data")]
    DecryptionFailed,

    #[error("Key derivation failed: {0}")]
    KeyDerivationFailed(String),

    // --- Remote store errors ---
    #[error("Network error: {0}")]
    Network(String),

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("Vault returned an error: {0}")]
    Vault(String),

    #[error("Malformed response from vault: {0}")]
    MalformedResponse(String),

    #[error("Secret '{0}' not found on the server")]
    SecretNotFound(String),

    #[error("Invalid entry name: {0}")]
    InvalidName(String),

    #[error("Entry has no encrypted name — it was never written to the vault")]
    MissingEncryptedName,

    // --- Entry lookup errors (CLI) ---
    #[error("Entry '{0}' not found")]
    EntryNotFound(String),

    #[error("Entry '{0}' already exists")]
    EntryAlreadyExists(String),

    // --- Config errors ---
    #[error("Config file not found at {0} — run `passvault init` first")]
    ConfigNotFound(PathBuf),

    #[error("Config file already exists at {0} (use --force to overwrite)")]
    ConfigAlreadyExists(PathBuf),

    #[error("Config file error: {0}")]
    ConfigError(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- Serialization errors ---
    #[error("Serialization error: {0}")]
    SerializationError(String),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for Pass Vault results.
pub type Result<T> = std::result::Result<T, PassError>;
