//! `passvault generate` — print a random password.

use crate::crypto::random;
use crate::errors::{PassError, Result};

/// Execute the `generate` command.
pub fn execute(length: usize) -> Result<()> {
    if length == 0 {
        return Err(PassError::CommandFailed(
            "length must be at least 1".into(),
        ));
    }

    println!("{}", random::password(length));
    Ok(())
}
