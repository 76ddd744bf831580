use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::crypto::{KdfAlgorithm, SealedToken};
use crate::errors::{PassError, Result};

/// The sealed master token as stored in the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedToken {
    /// Hex `nonce || ciphertext` of the master token.
    pub token: String,
    /// Hex salt the token key was derived with.
    pub salt: String,
}

impl From<SealedToken> for EncryptedToken {
    fn from(sealed: SealedToken) -> Self {
        Self {
            token: sealed.token,
            salt: sealed.salt,
        }
    }
}

/// Client configuration, loaded from `config.json`.
///
/// ```json
/// {"encrypted":{"token":"<hex>","salt":"<hex>"},"host":"...","port":8200,"ca":"<PEM>"}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Configuration {
    pub encrypted: EncryptedToken,

    /// Vault server host name.
    pub host: String,

    /// Vault server port.
    pub port: u16,

    /// PEM of the only CA the client trusts.
    pub ca: String,

    /// Key derivation algorithm the store was created with. Config files
    /// written before this field existed use Argon2id.
    #[serde(default)]
    pub kdf: KdfAlgorithm,
}

// ── Implementation ───────────────────────────────────────────────────

impl Configuration {
    /// Name of the config file inside the config directory.
    const FILE_NAME: &'static str = "config.json";

    /// Load the configuration from `path`.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(PassError::ConfigNotFound(path.to_path_buf()));
        }

        let contents = fs::read_to_string(path)?;

        serde_json::from_str(&contents).map_err(|e| {
            PassError::ConfigError(format!("Failed to parse {}: {e}", path.display()))
        })
    }

    /// Write the configuration to `path` atomically (temp file + rename).
    ///
    /// On Unix the file is restricted to owner read/write.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| PassError::SerializationError(format!("config: {e}")))?;

        let parent = path.parent().unwrap_or(Path::new("."));
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = parent.join(format!(
            ".{}.tmp",
            path.file_name().unwrap_or_default().to_string_lossy()
        ));
        fs::write(&tmp_path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&tmp_path, path)?;
        Ok(())
    }

    /// Base URL of the secret mount, e.g. `https://vault:8200/v1/secret`.
    pub fn entry_point(&self) -> String {
        format!("https://{}:{}/v1/secret", self.host, self.port)
    }

    /// Default config location: `$HOME/.config/passvault/config.json`.
    pub fn default_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| {
                PassError::ConfigError("cannot locate home directory (HOME is unset)".into())
            })?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("passvault")
            .join(Self::FILE_NAME))
    }
}

// ── Tests ────────────────────────────────────────────────────────────
