//! JSON shapes exchanged with the Vault KV v1 API.
//!
//! Request bodies:
//!
//! ```text
//! PUT /v1/secret/<hex name>   {"encrypted": "<base64>"}
//! PUT /v1/secret/updated      {"tag": "<32 random chars>"}
//! ```
//!
//! Every response is read into the same envelope,
//! `{"data": {...}, "errors": [...]}`, whatever the endpoint.
//!
//! Byte fields (`encrypted`, `file`) are JSON strings holding base64, and
//! `null` is accepted wherever a field may be missing.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::{PassError, Result};

/// Header carrying the bearer token on every request.
pub const VAULT_TOKEN_HEADER: &str = "X-Vault-Token";

/// Path (relative to the entry point) of the listing tag.
pub const TAG_PATH: &str = "/updated";

/// Padding floor for entry payloads, in bytes.
pub const MINIMUM_DATA_LENGTH: usize = 3 * 32;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of a tag write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRequest {
    pub tag: String,
}

/// Body of an entry write. `encrypted` holds the ASCII base64 text of
/// the AEAD blob; on the wire it is base64-encoded once more.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedRequest {
    #[serde(serialize_with = "base64_encode", deserialize_with = "base64_decode")]
    pub encrypted: Vec<u8>,
}

/// Plaintext of an entry before encryption.
#[derive(Default, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct SecretPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub password: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,

    #[serde(
        default,
        serialize_with = "base64_encode",
        deserialize_with = "base64_decode"
    )]
    pub file: Vec<u8>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub padding: String,
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// `data` object of a response. Which fields are filled depends on the
/// endpoint: `tag` for the tag path, `encrypted` for an entry, `keys`
/// for a LIST.
#[derive(Debug, Default, Deserialize)]
pub struct ResponseData {
    #[serde(default, deserialize_with = "null_as_default")]
    pub tag: String,

    #[serde(default, deserialize_with = "base64_decode")]
    pub encrypted: Vec<u8>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub keys: Vec<String>,
}

/// Generic response envelope.
#[derive(Debug, Default, Deserialize)]
pub struct VaultResponse {
    /// HTTP status code; filled in by the transport.
    #[serde(skip)]
    pub status: u16,

    #[serde(default)]
    pub data: Option<ResponseData>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub errors: Vec<String>,
}

impl VaultResponse {
    /// Parse a response body. An empty body (e.g. `204 No Content`) is
    /// an empty envelope; anything else must be valid JSON.
    pub fn from_body(status: u16, body: &str) -> Result<Self> {
        let mut response = if body.trim().is_empty() {
            Self::default()
        } else {
            serde_json::from_str::<Self>(body)
                .map_err(|e| PassError::MalformedResponse(format!("HTTP {status}: {e}")))?
        };
        response.status = status;
        Ok(response)
    }

    /// Turn a non-empty `errors` array into a `PassError::Vault`.
    pub fn check(self) -> Result<Self> {
        if self.errors.is_empty() {
            Ok(self)
        } else {
            Err(PassError::Vault(self.errors.join("; ")))
        }
    }

    /// Whether the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// The `data` object, or an empty one.
    pub fn into_data(self) -> ResponseData {
        self.data.unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Serde helpers
// ---------------------------------------------------------------------------

pub(crate) fn base64_encode<S>(data: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let encoded = BASE64.encode(data);
    serializer.serialize_str(&encoded)
}

pub(crate) fn base64_decode<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    BASE64.decode(&s).map_err(serde::de::Error::custom)
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
