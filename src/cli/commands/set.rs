//! `passvault set` — create or update an entry.

use std::fs;
use std::io::{self, IsTerminal, Read};

use zeroize::Zeroizing;

use crate::cli::output;
use crate::cli::{display_name, find_name, open_client, Cli};
use crate::crypto::random;
use crate::errors::{PassError, Result};
use crate::vault::{DecodedEntry, EntryType};

/// Execute the `set` command.
pub fn execute(
    cli: &Cli,
    name: &str,
    entry_type: EntryType,
    username: Option<&str>,
    file: Option<&str>,
    generate: Option<usize>,
) -> Result<()> {
    if name.is_empty() {
        return Err(PassError::CommandFailed("entry name cannot be empty".into()));
    }
    let label = display_name(name, entry_type);

    // Read the attachment before prompting so a bad path fails fast.
    let file_bytes = match file {
        Some(path) => Some(fs::read(path)?),
        None => None,
    };

    let mut client = open_client(cli)?;

    // Update in place when the entry exists, so it keeps its encrypted name.
    let mut entry = match find_name(&mut client, name, entry_type) {
        Ok(stored) => client.read(&stored)?,
        Err(PassError::EntryNotFound(_)) => DecodedEntry::new(name, entry_type)?,
        Err(e) => return Err(e),
    };
    let existed = entry.name.is_stored();

    if entry_type == EntryType::File && file_bytes.is_none() && !existed {
        return Err(PassError::CommandFailed(
            "file entries need --file <path>".into(),
        ));
    }

    if let Some(u) = username {
        entry.username = u.to_string();
    }
    if let Some(bytes) = file_bytes {
        entry.file = bytes;
    }

    // Determine the password from one of three sources.
    if let Some(len) = generate {
        // Source 1: Generated.
        entry.password = random::password(len);
        output::info(&format!("Generated a {len}-character password."));
    } else if entry_type != EntryType::File {
        let secret = read_secret(&label, existed)?;
        // An empty answer keeps the stored password.
        if !secret.is_empty() {
            entry.password = secret.to_string();
        }
    }

    client.write(&mut entry)?;

    if existed {
        output::success(&format!("Entry '{label}' updated"));
    } else {
        output::success(&format!("Entry '{label}' added"));
    }

    Ok(())
}

/// Source 2: piped stdin. Source 3: interactive secure prompt.
fn read_secret(label: &str, allow_empty: bool) -> Result<Zeroizing<String>> {
    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        return Ok(Zeroizing::new(buf.trim_end().to_string()));
    }

    let prompt = if allow_empty {
        format!("New password for {label} (empty keeps the current one)")
    } else {
        format!("Password for {label}")
    };

    dialoguer::Password::new()
        .with_prompt(prompt)
        .allow_empty_password(allow_empty)
        .interact()
        .map(Zeroizing::new)
        .map_err(|e| PassError::CommandFailed(format!("input prompt: {e}")))
}
