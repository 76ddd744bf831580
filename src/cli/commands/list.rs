//! `passvault list` — show entry names in a table.

use crate::cli::output;
use crate::cli::{open_client, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, filter: Option<&str>) -> Result<()> {
    let mut client = open_client(cli)?;

    let names = client.list(filter.unwrap_or(""))?;

    output::info(&format!("{} entr(ies)", names.len()));
    output::print_names_table(&names);

    Ok(())
}
