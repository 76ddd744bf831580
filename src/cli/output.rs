//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{DecodedEntry, EntryType, Name};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of entry names (Name, Type).
pub fn print_names_table(names: &[Name]) {
    if names.is_empty() {
        info("No matching entries.");
        tip("Run `passvault set <NAME>` to add one.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Type"]);

    for name in names {
        table.add_row(vec![
            name.base_name().to_string(),
            name.entry_type().to_string(),
        ]);
    }

    println!("{table}");
}

/// Print the fields of a decrypted entry.
pub fn print_entry(entry: &DecodedEntry) {
    let entry_type = entry.name.entry_type();

    println!("{} {}", style("name:").dim(), entry.name.base_name());
    if !entry.username.is_empty() {
        println!("{} {}", style("username:").dim(), entry.username);
    }

    let secret_label = match entry_type {
        EntryType::Otp => "secret:",
        _ => "password:",
    };
    if !entry.password.is_empty() {
        println!("{} {}", style(secret_label).dim(), entry.password);
    }

    if !entry.file.is_empty() {
        println!("{} {} bytes", style("file:").dim(), entry.file.len());
    }
}
