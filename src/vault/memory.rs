//! In-process stand-in for a Vault KV v1 mount.
//!
//! Behaves like the real engine for the operations the client uses:
//! token check, GET/PUT/DELETE of single keys, LIST of the mount (the tag
//! key shows up in the listing, as it does on a real server), 404 with an
//! empty `errors` array for missing keys. Clones share the same store, so
//! two clients can be pointed at one "server".

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::{json, Value};

use super::transport::{Method, Transport};
use super::wire::VaultResponse;
use crate::errors::{PassError, Result};

#[derive(Default)]
struct State {
    entries: BTreeMap<String, Value>,
    requests: Vec<(Method, String)>,
    offline: bool,
    fail_next: Option<Method>,
}

/// Shared in-memory backend that records every request it serves.
#[derive(Clone)]
pub struct MemoryTransport {
    token: String,
    state: Arc<Mutex<State>>,
}

impl MemoryTransport {
    /// A backend that accepts only `token`.
    pub fn new(token: &str) -> Self {
        Self {
            token: token.to_string(),
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Simulate the network being down: every request fails with
    /// `PassError::Network` until switched back.
    pub fn set_offline(&self, offline: bool) {
        self.state().offline = offline;
    }

    /// Fail the next request using `method` with a timeout, once.
    pub fn fail_next(&self, method: Method) {
        self.state().fail_next = Some(method);
    }

    /// All requests served so far, oldest first.
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.state().requests.clone()
    }

    /// Forget the request log.
    pub fn clear_requests(&self) {
        self.state().requests.clear();
    }

    /// Number of stored keys, including the tag key.
    pub fn key_count(&self) -> usize {
        self.state().entries.len()
    }

    /// Raw stored body for `key` (mount-relative, without leading `/`).
    pub fn raw(&self, key: &str) -> Option<Value> {
        self.state().entries.get(key).cloned()
    }

    /// Store a raw body, bypassing the client (e.g. foreign data).
    pub fn insert_raw(&self, key: &str, value: Value) {
        self.state().entries.insert(key.to_string(), value);
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn reply(status: u16, body: Value) -> Result<VaultResponse> {
        VaultResponse::from_body(status, &body.to_string())
    }
}

impl Transport for MemoryTransport {
    fn request(
        &self,
        token: &str,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<VaultResponse> {
        let mut state = self.state();

        if state.offline {
            return Err(PassError::Network(format!("{method} {path}: connection refused")));
        }
        if state.fail_next == Some(method) {
            state.fail_next = None;
            return Err(PassError::Network(format!("{method} {path}: timeout")));
        }
        state.requests.push((method, path.to_string()));

        if token != self.token {
            return Self::reply(403, json!({ "errors": ["permission denied"] }));
        }

        let key = path.trim_start_matches('/').to_string();

        match method {
            Method::List => {
                if !key.is_empty() {
                    return Self::reply(405, json!({ "errors": ["unsupported path"] }));
                }
                if state.entries.is_empty() {
                    return Self::reply(404, json!({ "errors": [] }));
                }
                let keys: Vec<&String> = state.entries.keys().collect();
                Self::reply(200, json!({ "data": { "keys": keys } }))
            }
            Method::Get => match state.entries.get(&key) {
                Some(data) => Self::reply(200, json!({ "data": data })),
                None => Self::reply(404, json!({ "errors": [] })),
            },
            Method::Put => match body {
                Some(data) if data.is_object() && !key.is_empty() => {
                    state.entries.insert(key, data.clone());
                    VaultResponse::from_body(204, "")
                }
                _ => Self::reply(400, json!({ "errors": ["missing data"] })),
            },
            Method::Delete => {
                state.entries.remove(&key);
                VaultResponse::from_body(204, "")
            }
        }
    }
}
