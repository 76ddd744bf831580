//! `passvault delete` — remove an entry from the server.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{display_name, find_name, open_client, Cli};
use crate::errors::{PassError, Result};
use crate::vault::EntryType;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, name: &str, entry_type: EntryType, force: bool) -> Result<()> {
    let label = display_name(name, entry_type);

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete entry '{label}'?"))
            .default(false)
            .interact()
            .map_err(|e| PassError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let mut client = open_client(cli)?;
    let stored = find_name(&mut client, name, entry_type)?;
    client.delete_name(&stored)?;

    output::success(&format!("Deleted entry '{label}'"));

    Ok(())
}
