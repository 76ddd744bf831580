//! Entry types: `EntryType`, `Name` and `DecodedEntry`.

use std::fmt;
use std::str::FromStr;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::names;
use crate::errors::{PassError, Result};

/// What kind of secret an entry holds. Decides how a front end renders
/// it; storage is identical for every type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum EntryType {
    #[default]
    Account,
    Otp,
    File,
    Sign,
}

impl EntryType {
    pub const ALL: [EntryType; 4] = [Self::Account, Self::Otp, Self::File, Self::Sign];

    /// Marker appended to the plaintext name before it is encrypted.
    pub fn suffix(self) -> &'static str {
        match self {
            Self::Account => "",
            Self::Otp => "__otp",
            Self::File => "__file",
            Self::Sign => "__sign",
        }
    }

    /// Short human-readable label (empty for plain accounts).
    pub fn label(self) -> &'static str {
        match self {
            Self::Account => "",
            Self::Otp => "OTP",
            Self::File => "File",
            Self::Sign => "Sign",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Account => "account",
            Self::Otp => "otp",
            Self::File => "file",
            Self::Sign => "sign",
        };
        f.write_str(s)
    }
}

impl FromStr for EntryType {
    type Err = PassError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "account" => Ok(Self::Account),
            "otp" => Ok(Self::Otp),
            "file" => Ok(Self::File),
            "sign" => Ok(Self::Sign),
            other => Err(PassError::CommandFailed(format!(
                "unknown entry type '{other}' (expected account, otp, file or sign)"
            ))),
        }
    }
}

/// Identifies one logical secret.
///
/// `text` is the full decrypted name including the type suffix and never
/// leaves the client; `encrypted` is the hex ciphertext used as the
/// remote key. Once assigned, `encrypted` never changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Zeroize)]
pub struct Name {
    pub text: String,
    pub encrypted: String,
}

impl Name {
    /// A name for an entry that has not been written yet.
    ///
    /// Fails with `InvalidName` if `base_name` is empty or ends in a type
    /// suffix, since it would not decode back to the same name and type.
    pub fn new(base_name: &str, entry_type: EntryType) -> Result<Self> {
        names::validate(base_name)?;
        Ok(Self {
            text: format!("{base_name}{}", entry_type.suffix()),
            encrypted: String::new(),
        })
    }

    /// The name without its type suffix.
    pub fn base_name(&self) -> &str {
        names::decode(&self.text).0
    }

    /// The entry type recovered from the suffix.
    pub fn entry_type(&self) -> EntryType {
        names::decode(&self.text).1
    }

    /// Whether this name already has a remote key.
    pub fn is_stored(&self) -> bool {
        !self.encrypted.is_empty()
    }
}

/// The decrypted contents of one secret. Zeroized when dropped.
#[derive(Clone, Default, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DecodedEntry {
    pub name: Name,
    pub username: String,
    pub password: String,
    pub file: Vec<u8>,
}

impl DecodedEntry {
    /// An empty entry of the given type, ready to be filled and written.
    pub fn new(base_name: &str, entry_type: EntryType) -> Result<Self> {
        Ok(Self {
            name: Name::new(base_name, entry_type)?,
            username: String::new(),
            password: String::new(),
            file: Vec::new(),
        })
    }
}

impl fmt::Debug for DecodedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedEntry")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("file_len", &self.file.len())
            .finish()
    }
}
