//! `passvault rename` — move an entry to a new name.

use crate::cli::output;
use crate::cli::{display_name, find_name, open_client, Cli};
use crate::errors::{PassError, Result};
use crate::vault::EntryType;

/// Execute the `rename` command.
pub fn execute(cli: &Cli, name: &str, new_name: &str, entry_type: EntryType) -> Result<()> {
    if new_name.is_empty() {
        return Err(PassError::CommandFailed("new name cannot be empty".into()));
    }

    let mut client = open_client(cli)?;

    if find_name(&mut client, new_name, entry_type).is_ok() {
        return Err(PassError::EntryAlreadyExists(display_name(
            new_name, entry_type,
        )));
    }

    let stored = find_name(&mut client, name, entry_type)?;
    let mut entry = client.read(&stored)?;
    client.rename(&mut entry, new_name)?;

    output::success(&format!(
        "Renamed '{}' to '{}'",
        display_name(name, entry_type),
        display_name(new_name, entry_type)
    ));

    Ok(())
}
