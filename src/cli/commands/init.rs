//! `passvault init` — seal the Vault token and write the config file.

use std::fs;

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{config_path, prompt_new_password, Cli};
use crate::config::{Configuration, EncryptedToken};
use crate::crypto::{KdfAlgorithm, Lock};
use crate::errors::{PassError, Result};

/// Execute the `init` command.
pub fn execute(
    cli: &Cli,
    host: &str,
    port: u16,
    ca_path: &str,
    kdf: KdfAlgorithm,
    force: bool,
) -> Result<()> {
    let path = config_path(cli)?;

    // 1. Refuse to clobber an existing store's config by accident.
    if path.exists() && !force {
        return Err(PassError::ConfigAlreadyExists(path));
    }

    // 2. Read the CA certificate the client will pin.
    let ca = fs::read_to_string(ca_path)
        .map_err(|e| PassError::ConfigError(format!("cannot read CA file {ca_path}: {e}")))?;
    if !ca.contains("BEGIN CERTIFICATE") {
        return Err(PassError::ConfigError(format!(
            "{ca_path} does not look like a PEM certificate"
        )));
    }

    // 3. The Vault token to seal, then the master password.
    let token = prompt_token()?;
    let password = prompt_new_password()?;

    // 4. Seal the token under a key derived from a fresh salt.
    let lock = Lock::create(password.as_bytes(), kdf)?;
    let sealed = lock.seal_token(&token)?;

    let config = Configuration {
        encrypted: EncryptedToken::from(sealed),
        host: host.to_string(),
        port,
        ca,
        kdf,
    };
    config.save(&path)?;

    output::success(&format!("Config written to {}", path.display()));
    output::info(&format!("Key derivation: {kdf}"));
    output::tip("Run `passvault list` to check the connection.");

    Ok(())
}

/// Read the Vault token from `PASSVAULT_TOKEN` or an interactive prompt.
fn prompt_token() -> Result<Zeroizing<String>> {
    if let Ok(token) = std::env::var("PASSVAULT_TOKEN") {
        if !token.is_empty() {
            return Ok(Zeroizing::new(token));
        }
    }

    let token = dialoguer::Password::new()
        .with_prompt("Vault token")
        .interact()
        .map_err(|e| PassError::CommandFailed(format!("token prompt: {e}")))?;
    Ok(Zeroizing::new(token))
}
