//! `passvault get` — decrypt and show a single entry.

use std::fs;

use crate::cli::output;
use crate::cli::{find_name, open_client, Cli};
use crate::errors::Result;
use crate::vault::EntryType;

/// Execute the `get` command.
pub fn execute(cli: &Cli, name: &str, entry_type: EntryType, out: Option<&str>) -> Result<()> {
    let mut client = open_client(cli)?;

    let stored = find_name(&mut client, name, entry_type)?;
    let entry = client.read(&stored)?;

    match out {
        Some(path) => {
            fs::write(path, &entry.file)?;
            output::success(&format!("Wrote {} bytes to {path}", entry.file.len()));
        }
        None => output::print_entry(&entry),
    }

    Ok(())
}
