//! Authenticated HTTPS transport to the Vault KV API.
//!
//! `Transport` is the seam between the client's consistency logic and
//! the network. `HttpTransport` is the real implementation: a `ureq`
//! agent that trusts exactly one CA certificate (no system roots), uses a
//! fixed 10-second timeout, and never retries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use ureq::http::{self, Method as HttpMethod};
use ureq::tls::{Certificate, RootCerts, TlsConfig};
use ureq::Agent;

use super::wire::{VaultResponse, VAULT_TOKEN_HEADER};
use crate::errors::{PassError, Result};

/// Per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Verbs understood by the KV engine. `List` is Vault's non-standard
/// `LIST` method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Put,
    Delete,
    List,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::List => "LIST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Executes one authenticated request against the secret mount.
///
/// `path` is relative to the mount (`""` for the mount itself,
/// `"/<hex name>"` for an entry). A non-empty `errors` array comes back
/// inside the `VaultResponse`; only transport-level problems are `Err`.
pub trait Transport {
    fn request(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<VaultResponse>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn request(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<VaultResponse> {
        (**self).request(token, method, path, body)
    }
}

/// Blocking HTTPS transport pinned to a single CA.
pub struct HttpTransport {
    agent: Agent,
    entry_point: String,
}

impl HttpTransport {
    /// Build a transport for `entry_point` (e.g.
    /// `https://vault.example:8200/v1/secret`) trusting only `ca_pem`.
    pub fn new(entry_point: &str, ca_pem: &str) -> Result<Self> {
        let ca = Certificate::from_pem(ca_pem.as_bytes())
            .map_err(|e| PassError::Tls(format!("invalid CA certificate: {e}")))?;

        let tls = TlsConfig::builder()
            .root_certs(RootCerts::Specific(Arc::new(vec![ca])))
            .build();

        let config = Agent::config_builder()
            .tls_config(tls)
            .timeout_global(Some(REQUEST_TIMEOUT))
            .http_status_as_error(false)
            .allow_non_standard_methods(true)
            .build();

        Ok(Self {
            agent: Agent::new_with_config(config),
            entry_point: entry_point.trim_end_matches('/').to_string(),
        })
    }

    /// The base URL every path is appended to.
    pub fn entry_point(&self) -> &str {
        &self.entry_point
    }
}

impl Transport for HttpTransport {
    fn request(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> Result<VaultResponse> {
        let url = format!("{}{}", self.entry_point, path);

        let http_method = HttpMethod::from_bytes(method.as_str().as_bytes())
            .map_err(|e| PassError::Network(format!("invalid method {method}: {e}")))?;

        let builder = http::Request::builder()
            .method(http_method)
            .uri(&url)
            .header(VAULT_TOKEN_HEADER, token);

        let result = match body {
            Some(json) => {
                let bytes = serde_json::to_vec(json)
                    .map_err(|e| PassError::SerializationError(format!("request body: {e}")))?;
                let request = builder
                    .header("Content-Type", "application/json")
                    .body(bytes)
                    .map_err(|e| PassError::Network(format!("building request: {e}")))?;
                self.agent.run(request)
            }
            None => {
                let request = builder
                    .body(())
                    .map_err(|e| PassError::Network(format!("building request: {e}")))?;
                self.agent.run(request)
            }
        };

        let mut response = result.map_err(|e| PassError::Network(format!("{method} {e}")))?;
        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| PassError::Network(format!("reading response: {e}")))?;

        VaultResponse::from_body(status, &text)
    }
}
