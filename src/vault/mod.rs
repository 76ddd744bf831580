//! Vault module — the encrypted remote store.
//!
//! This module provides:
//! - `EntryType`, `Name` and `DecodedEntry` (`entry`)
//! - The entry-name codec with type suffixes (`names`)
//! - Request/response JSON shapes (`wire`)
//! - The `Transport` seam and its HTTPS implementation (`transport`)
//! - An in-process KV backend (`memory`)
//! - `VaultClient` with the tag-invalidated listing cache (`client`)

pub mod client;
pub mod entry;
pub mod memory;
pub mod names;
pub mod transport;
pub mod wire;

pub use client::VaultClient;
pub use entry::{DecodedEntry, EntryType, Name};
pub use memory::MemoryTransport;
pub use transport::{HttpTransport, Method, Transport};
