//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::Configuration;
use crate::crypto::random::DEFAULT_PASSWORD_LEN;
use crate::crypto::KdfAlgorithm;
use crate::errors::{PassError, Result};
use crate::vault::{EntryType, Name, VaultClient};

/// Minimum master password length to prevent trivially weak passwords.
const MIN_PASSWORD_LEN: usize = 8;

/// Pass Vault CLI: end-to-end encrypted passwords on a Vault server.
#[derive(Parser)]
#[command(
    name = "passvault",
    about = "End-to-end encrypted password store on a Vault server",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (default: ~/.config/passvault/config.json)
    #[arg(long, env = "PASSVAULT_CONFIG", global = true)]
    pub config: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Seal the Vault token under a new master password and write the config
    Init {
        /// Vault server host name
        #[arg(long)]
        host: String,
        /// Vault server port
        #[arg(long, default_value_t = 8200)]
        port: u16,
        /// Path to the PEM file of the CA that signed the server certificate
        #[arg(long)]
        ca: String,
        /// Key derivation algorithm: argon2id or pbkdf2-sha256
        #[arg(long, default_value = "argon2id")]
        kdf: KdfAlgorithm,
        /// Overwrite an existing config file
        #[arg(short, long)]
        force: bool,
    },

    /// List entries, optionally filtered by a substring of the name
    List {
        /// Only show names containing this text
        filter: Option<String>,
    },

    /// Show an entry (or save a file entry to disk)
    Get {
        /// Entry name
        name: String,
        /// Entry type: account, otp, file or sign
        #[arg(short = 't', long = "type", default_value = "account")]
        entry_type: EntryType,
        /// Write the entry's file contents here instead of printing
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Create or update an entry
    Set {
        /// Entry name
        name: String,
        /// Entry type: account, otp, file or sign
        #[arg(short = 't', long = "type", default_value = "account")]
        entry_type: EntryType,
        /// Username to store
        #[arg(short, long)]
        username: Option<String>,
        /// Attach the contents of this file
        #[arg(long)]
        file: Option<String>,
        /// Generate a random password of this length instead of prompting
        #[arg(short, long, num_args = 0..=1, default_missing_value = "32")]
        generate: Option<usize>,
    },

    /// Delete an entry
    Delete {
        /// Entry name
        name: String,
        /// Entry type: account, otp, file or sign
        #[arg(short = 't', long = "type", default_value = "account")]
        entry_type: EntryType,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Rename an entry (keeps its type and contents)
    Rename {
        /// Current entry name
        name: String,
        /// New entry name
        new_name: String,
        /// Entry type: account, otp, file or sign
        #[arg(short = 't', long = "type", default_value = "account")]
        entry_type: EntryType,
    },

    /// Print a random password
    Generate {
        /// Number of characters
        #[arg(short, long, default_value_t = DEFAULT_PASSWORD_LEN)]
        length: usize,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolve the config file path from `--config` / `PASSVAULT_CONFIG`,
/// falling back to the default location.
pub fn config_path(cli: &Cli) -> Result<PathBuf> {
    match &cli.config {
        Some(path) => Ok(PathBuf::from(path)),
        None => Configuration::default_path(),
    }
}

/// Get the master password, trying in order:
/// 1. `PASSVAULT_PASSWORD` env var (scripts/CI)
/// 2. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn prompt_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("PASSVAULT_PASSWORD") {
        if !pw.is_empty() {
            return Ok(Zeroizing::new(pw));
        }
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Master password")
        .interact()
        .map_err(|e| PassError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Prompt for a new master password with confirmation (used during `init`).
///
/// Also respects `PASSVAULT_PASSWORD` for scripted usage.
/// Enforces a minimum password length.
pub fn prompt_new_password() -> Result<Zeroizing<String>> {
    if let Ok(pw) = std::env::var("PASSVAULT_PASSWORD") {
        if !pw.is_empty() {
            if pw.len() < MIN_PASSWORD_LEN {
                return Err(PassError::CommandFailed(format!(
                    "password must be at least {MIN_PASSWORD_LEN} characters"
                )));
            }
            return Ok(Zeroizing::new(pw));
        }
    }

    loop {
        let password = dialoguer::Password::new()
            .with_prompt("Choose master password")
            .with_confirmation(
                "Confirm master password",
                "Passwords do not match, try again",
            )
            .interact()
            .map_err(|e| PassError::CommandFailed(format!("password prompt: {e}")))?;

        if password.len() < MIN_PASSWORD_LEN {
            output::warning(&format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters. Try again."
            ));
            continue;
        }

        return Ok(Zeroizing::new(password));
    }
}

/// Load the config, ask for the master password and connect.
pub fn open_client(cli: &Cli) -> Result<VaultClient> {
    let config = Configuration::load(&config_path(cli)?)?;
    let password = prompt_password()?;
    VaultClient::connect(&config, password.as_bytes())
}

/// Look up the stored name for `name` of type `entry_type`.
pub fn find_name(client: &mut VaultClient, name: &str, entry_type: EntryType) -> Result<Name> {
    client
        .list(name)?
        .into_iter()
        .find(|n| n.base_name() == name && n.entry_type() == entry_type)
        .ok_or_else(|| PassError::EntryNotFound(display_name(name, entry_type)))
}

/// `name` or `name (OTP)` for messages.
pub fn display_name(name: &str, entry_type: EntryType) -> String {
    match entry_type {
        EntryType::Account => name.to_string(),
        other => format!("{name} ({})", other.label()),
    }
}
