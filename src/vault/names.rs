//! Entry name codec.
//!
//! The entry type travels inside the encrypted name as a string suffix
//! (`__otp`, `__file`, `__sign`; none for accounts). The server only ever
//! sees the hex ciphertext of `<name><suffix>`.

use crate::crypto::Lock;
use crate::errors::{PassError, Result};

use super::entry::{EntryType, Name};

/// Append the type suffix to `name` and encrypt it to a hex remote key.
pub fn encode(lock: &Lock, name: &str, entry_type: EntryType) -> Result<String> {
    lock.encrypt_and_encode_hex(&format!("{name}{}", entry_type.suffix()))
}

/// Check that `name` can be stored and decoded back unchanged.
///
/// Empty names would be dropped from every listing, and a name ending in
/// a type suffix would decode as a different type.
pub fn validate(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(PassError::InvalidName("name cannot be empty".into()));
    }
    for entry_type in [EntryType::Otp, EntryType::File, EntryType::Sign] {
        if name.ends_with(entry_type.suffix()) {
            return Err(PassError::InvalidName(format!(
                "'{name}' ends with the reserved suffix '{}'",
                entry_type.suffix()
            )));
        }
    }
    Ok(())
}

/// Split a decrypted name into its base name and type.
///
/// Never fails: a name without a recognised suffix is an `Account`, so
/// keys written by older clients stay visible.
pub fn decode(plaintext: &str) -> (&str, EntryType) {
    for entry_type in [EntryType::Otp, EntryType::File, EntryType::Sign] {
        if let Some(base) = plaintext.strip_suffix(entry_type.suffix()) {
            return (base, entry_type);
        }
    }
    (plaintext, EntryType::Account)
}

/// Decrypt a remote key into a `Name`.
///
/// Fails closed: a key that does not authenticate under this lock, or
/// whose base name is empty, is rejected as a whole.
pub fn decrypt(lock: &Lock, hex_name: &str) -> Result<Name> {
    let text = lock.hex_decode_and_decrypt(hex_name)?;

    if decode(&text).0.is_empty() {
        return Err(PassError::DecryptionFailed);
    }

    Ok(Name {
        text,
        encrypted: hex_name.to_string(),
    })
}
