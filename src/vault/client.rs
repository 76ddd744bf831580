//! `VaultClient`: encrypted CRUD plus the cached, tag-invalidated listing.
//!
//! Listing every key means decrypting every key, which is too slow to do
//! on each search keystroke. The client therefore caches the decrypted
//! listing and only re-fetches it when the listing tag stored at
//! `/updated` has changed. Every client that writes or deletes puts a fresh
//! random tag there, so other clients notice on their next `list`. The
//! writer itself sets `local_update` and skips the tag round trip.
//!
//! The cache is eventually consistent: a remote write that lands between
//! our tag check and our use of the listing is missed until the next
//! `list`. All state lives behind `&mut self`, so a client has exactly
//! one owner at a time.

use std::mem;

use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::entry::{DecodedEntry, Name};
use super::names;
use super::transport::{HttpTransport, Method, Transport};
use super::wire::{
    EncryptedRequest, SecretPayload, TagRequest, VaultResponse, MINIMUM_DATA_LENGTH, TAG_PATH,
};
use crate::config::Configuration;
use crate::crypto::{random, Lock};
use crate::errors::{PassError, Result};

/// Length of the random listing tag.
pub const TAG_LEN: usize = 32;

/// Tag value before the first check; never produced by `update_tag`.
const INITIAL_TAG: &str = "-";

/// Session client for one unlocked store.
pub struct VaultClient<T: Transport = HttpTransport> {
    transport: T,
    lock: Lock,
    token: Zeroizing<String>,
    cached_tag: String,
    local_update: bool,
    search_result: Vec<Name>,
}

impl VaultClient<HttpTransport> {
    /// Unlock the store described by `config` with `password` and
    /// connect to it over HTTPS.
    ///
    /// Fails with `DecryptionFailed` if the password is wrong.
    pub fn connect(config: &Configuration, password: &[u8]) -> Result<Self> {
        let lock = Lock::from_hex_salt(password, &config.encrypted.salt, config.kdf)?;
        let token = lock.unlock_token(&config.encrypted.token)?;
        let transport = HttpTransport::new(&config.entry_point(), &config.ca)?;

        let mut client = Self::new(lock, transport);
        client.token = token;
        Ok(client)
    }
}

impl<T: Transport> VaultClient<T> {
    /// Create a client. The bearer token stays empty until `unlock`.
    ///
    /// `local_update` starts out `true` so the first `list` always
    /// fetches from the server.
    pub fn new(lock: Lock, transport: T) -> Self {
        Self {
            transport,
            lock,
            token: Zeroizing::new(String::new()),
            cached_tag: INITIAL_TAG.to_string(),
            local_update: true,
            search_result: Vec::new(),
        }
    }

    /// Decrypt the sealed master token with this client's lock and use
    /// it as the bearer token from now on.
    pub fn unlock(&mut self, encrypted_token: &str) -> Result<()> {
        self.token = self.lock.unlock_token(encrypted_token)?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Entry operations
    // ------------------------------------------------------------------

    /// Fetch and decrypt one entry.
    pub fn read(&self, name: &Name) -> Result<DecodedEntry> {
        if !name.is_stored() {
            return Err(PassError::MissingEncryptedName);
        }
        debug!("READ");

        let response = self.request(Method::Get, &entry_path(name), None)?.check()?;
        if response.is_not_found() {
            return Err(PassError::SecretNotFound(name.base_name().to_string()));
        }

        let sealed = response.into_data().encrypted;
        let plaintext = self.lock.base64_decode_and_decrypt(&sealed)?;
        let mut payload: SecretPayload = serde_json::from_slice(&plaintext)
            .map_err(|e| PassError::MalformedResponse(format!("entry payload: {e}")))?;

        Ok(DecodedEntry {
            name: name.clone(),
            username: mem::take(&mut payload.username),
            password: mem::take(&mut payload.password),
            file: mem::take(&mut payload.file),
        })
    }

    /// Encrypt and store `entry`, then bump the listing tag.
    ///
    /// A new entry gets its encrypted name assigned once the PUT has
    /// succeeded; an existing one keeps the name it already has.
    pub fn write(&mut self, entry: &mut DecodedEntry) -> Result<()> {
        if entry.name.base_name().is_empty() {
            return Err(PassError::InvalidName("name cannot be empty".into()));
        }
        debug!(entry_type = %entry.name.entry_type(), "WRITE");

        let payload = encode_payload(entry)?;
        let sealed = self.lock.encrypt_and_encode_base64(&payload)?;

        let encrypted = if entry.name.is_stored() {
            entry.name.encrypted.clone()
        } else {
            names::encode(&self.lock, entry.name.base_name(), entry.name.entry_type())?
        };

        let body = serde_json::to_value(EncryptedRequest {
            encrypted: sealed.into_bytes(),
        })
        .map_err(|e| PassError::SerializationError(format!("entry request: {e}")))?;

        self.request(Method::Put, &format!("/{encrypted}"), Some(&body))?
            .check()?;
        entry.name.encrypted = encrypted;

        self.update_tag()
    }

    /// Remove `entry` from the server, then bump the listing tag.
    pub fn delete(&mut self, entry: &DecodedEntry) -> Result<()> {
        self.delete_name(&entry.name)
    }

    /// Remove the entry stored under `name`.
    ///
    /// Fails with `MissingEncryptedName` if `name` was never stored.
    pub fn delete_name(&mut self, name: &Name) -> Result<()> {
        if !name.is_stored() {
            return Err(PassError::MissingEncryptedName);
        }
        debug!("DELETE");

        self.request(Method::Delete, &entry_path(name), None)?
            .check()?;

        self.update_tag()
    }

    /// Store `entry` under a new base name and remove the old key.
    ///
    /// Encrypted names never change, so a rename is a create followed by
    /// a delete. The entry type is preserved.
    pub fn rename(&mut self, entry: &mut DecodedEntry, new_name: &str) -> Result<()> {
        let old_name = entry.name.clone();

        let mut renamed = entry.clone();
        renamed.name = Name::new(new_name, old_name.entry_type())?;

        self.write(&mut renamed)?;
        self.delete_name(&old_name)?;

        *entry = renamed;
        Ok(())
    }

    /// Return the stored names whose base name contains `filter`.
    ///
    /// The decrypted listing is re-fetched only when the tag says it
    /// changed. If the tag check itself cannot reach the server, the
    /// last listing is served.
    pub fn list(&mut self, filter: &str) -> Result<Vec<Name>> {
        debug!("LIST");

        let refresh = match self.is_tag_updated() {
            Ok(updated) => updated,
            Err(PassError::Network(e)) => {
                warn!(error = %e, "tag check failed, serving cached listing");
                false
            }
            Err(e) => return Err(e),
        };

        if refresh {
            if let Err(e) = self.refresh_listing() {
                // The tag is already recorded; force the next list to
                // fetch again instead of trusting the old listing.
                self.local_update = true;
                return Err(e);
            }
        } else {
            debug!("no tag change, using cached listing");
        }

        Ok(self
            .search_result
            .iter()
            .filter(|name| filter.is_empty() || name.base_name().contains(filter))
            .cloned()
            .collect())
    }

    // ------------------------------------------------------------------
    // Tag protocol
    // ------------------------------------------------------------------

    /// Whether the listing may have changed since we last looked.
    ///
    /// Always `true` right after our own write. Otherwise fetches the
    /// remote tag, remembers it, and reports whether it differed.
    pub fn is_tag_updated(&mut self) -> Result<bool> {
        if self.local_update {
            return Ok(true);
        }
        debug!("tag check");

        let tag = self
            .request(Method::Get, TAG_PATH, None)?
            .check()?
            .into_data()
            .tag;

        let updated = tag != self.cached_tag;
        self.cached_tag = tag;
        Ok(updated)
    }

    /// Publish a fresh random tag so other clients re-fetch their
    /// listing, and mark our own listing as stale.
    pub fn update_tag(&mut self) -> Result<()> {
        self.local_update = true;

        let tag = random::alphanumeric(TAG_LEN);
        let body = serde_json::to_value(TagRequest { tag: tag.clone() })
            .map_err(|e| PassError::SerializationError(format!("tag request: {e}")))?;

        self.request(Method::Put, TAG_PATH, Some(&body))?.check()?;

        // Our own tag is not news to us.
        self.cached_tag = tag;
        Ok(())
    }

    fn refresh_listing(&mut self) -> Result<()> {
        let keys = self
            .request(Method::List, "", None)?
            .check()?
            .into_data()
            .keys;

        let total = keys.len();
        let listing: Vec<Name> = keys
            .iter()
            .filter_map(|key| names::decrypt(&self.lock, key).ok())
            .collect();

        if listing.len() < total {
            debug!(
                skipped = total - listing.len(),
                "skipped keys that do not decrypt under this lock"
            );
        }

        self.search_result = listing;
        self.local_update = false;
        Ok(())
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<VaultResponse> {
        self.transport.request(&self.token, method, path, body)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// The last tag seen on (or written to) the server.
    pub fn cached_tag(&self) -> &str {
        &self.cached_tag
    }

    /// Whether this client was the last one to change the listing.
    pub fn has_local_update(&self) -> bool {
        self.local_update
    }

    /// The session lock.
    pub fn lock(&self) -> &Lock {
        &self.lock
    }
}

/// Serialize `entry` to the JSON that gets encrypted, padded so short
/// entries do not stand out by ciphertext length.
pub fn encode_payload(entry: &DecodedEntry) -> Result<Zeroizing<Vec<u8>>> {
    let payload = SecretPayload {
        password: entry.password.clone(),
        username: entry.username.clone(),
        file: entry.file.clone(),
        padding: random::alphanumeric(padding_length(entry)),
    };

    serde_json::to_vec(&payload)
        .map(Zeroizing::new)
        .map_err(|e| PassError::SerializationError(format!("entry payload: {e}")))
}

/// Number of padding characters added to `entry`'s payload.
///
/// The username is counted twice. Stores written so far were padded with
/// this formula, so it is kept as is.
pub fn padding_length(entry: &DecodedEntry) -> usize {
    let content_length = entry.username.len() + entry.username.len() + entry.file.len();
    MINIMUM_DATA_LENGTH.saturating_sub(content_length)
}

fn entry_path(name: &Name) -> String {
    format!("/{}", name.encrypted)
}
