//! Integration tests for `VaultClient` against the in-memory KV backend.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::json;

use passvault::crypto::{KdfAlgorithm, Lock};
use passvault::errors::PassError;
use passvault::vault::client::{encode_payload, padding_length, TAG_LEN};
use passvault::vault::wire::MINIMUM_DATA_LENGTH;
use passvault::vault::{DecodedEntry, EntryType, MemoryTransport, Method, Name, VaultClient};

const PASSWORD: &[u8] = b"correcthorsebatterystaple";
const TOKEN: &str = "s.deadbeef";
const SALT: [u8; 32] = [9u8; 32];

fn lock() -> Lock {
    Lock::new(PASSWORD, &SALT, KdfAlgorithm::Pbkdf2Sha256).expect("lock")
}

/// An unlocked client talking to `backend`.
fn client(backend: &MemoryTransport) -> VaultClient<MemoryTransport> {
    let lock = lock();
    let sealed = lock.seal_token(TOKEN).unwrap();
    let mut client = VaultClient::new(lock, backend.clone());
    client.unlock(&sealed.token).unwrap();
    client
}

fn account(name: &str, username: &str, password: &str) -> DecodedEntry {
    let mut entry = DecodedEntry::new(name, EntryType::Account).unwrap();
    entry.username = username.to_string();
    entry.password = password.to_string();
    entry
}

fn base_names(names: &[Name]) -> Vec<String> {
    names.iter().map(|n| n.base_name().to_string()).collect()
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[test]
fn write_then_read_roundtrip() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    let mut entry = account("github", "octocat", "hunter2");
    entry.file = b"recovery codes".to_vec();
    client.write(&mut entry).unwrap();
    assert!(entry.name.is_stored());

    let read = client.read(&entry.name).unwrap();
    assert_eq!(read, entry);
}

#[test]
fn write_keeps_existing_encrypted_name() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    let mut entry = account("github", "octocat", "v1");
    client.write(&mut entry).unwrap();
    let first = entry.name.encrypted.clone();

    entry.password = "v2".into();
    client.write(&mut entry).unwrap();

    assert_eq!(entry.name.encrypted, first);
    assert_eq!(client.read(&entry.name).unwrap().password, "v2");
    // Entry plus tag key.
    assert_eq!(backend.key_count(), 2);
}

#[test]
fn stored_body_hides_names_and_contents() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    let mut entry = account("github", "octocat", "hunter2");
    client.write(&mut entry).unwrap();

    let key = entry.name.encrypted.clone();
    assert!(!key.contains("github"));

    let raw = backend.raw(&key).unwrap();
    let outer = raw["encrypted"].as_str().expect("encrypted is a string");
    let inner = BASE64.decode(outer).expect("outer base64");
    let sealed = client.lock().base64_decode_and_decrypt(&inner).unwrap();
    let payload: serde_json::Value = serde_json::from_slice(&sealed).unwrap();

    assert_eq!(payload["username"], "octocat");
    assert_eq!(payload["password"], "hunter2");
    assert!(!raw.to_string().contains("hunter2"));
}

#[test]
fn read_missing_entry_is_not_found() {
    let backend = MemoryTransport::new(TOKEN);
    let client = client(&backend);

    let mut name = Name::new("ghost", EntryType::Account).unwrap();
    name.encrypted = client.lock().encrypt_and_encode_hex("ghost").unwrap();

    let result = client.read(&name);
    assert!(matches!(result, Err(PassError::SecretNotFound(_))));
}

#[test]
fn read_requires_encrypted_name() {
    let backend = MemoryTransport::new(TOKEN);
    let client = client(&backend);

    let result = client.read(&Name::new("never-written", EntryType::Account).unwrap());
    assert!(matches!(result, Err(PassError::MissingEncryptedName)));
    assert!(backend.requests().is_empty());
}

#[test]
fn delete_requires_encrypted_name() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    let entry = DecodedEntry::new("never-written", EntryType::Otp).unwrap();
    let result = client.delete(&entry);
    assert!(matches!(result, Err(PassError::MissingEncryptedName)));
    assert!(backend.requests().is_empty());
}

#[test]
fn delete_removes_entry_and_bumps_tag() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    let mut entry = account("github", "octocat", "hunter2");
    client.write(&mut entry).unwrap();
    let tag_after_write = client.cached_tag().to_string();

    client.delete(&entry).unwrap();

    assert!(backend.raw(&entry.name.encrypted).is_none());
    assert_ne!(client.cached_tag(), tag_after_write);
    assert!(client.list("").unwrap().is_empty());
}

#[test]
fn rename_moves_entry_and_keeps_type() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    let mut entry = DecodedEntry::new("old", EntryType::Otp).unwrap();
    entry.password = "JBSWY3DPEHPK3PXP".into();
    client.write(&mut entry).unwrap();
    let old_key = entry.name.encrypted.clone();

    client.rename(&mut entry, "new").unwrap();

    assert_eq!(entry.name.base_name(), "new");
    assert_eq!(entry.name.entry_type(), EntryType::Otp);
    assert_ne!(entry.name.encrypted, old_key);
    assert!(backend.raw(&old_key).is_none());

    let listed = client.list("").unwrap();
    assert_eq!(base_names(&listed), vec!["new"]);
    assert_eq!(listed[0].entry_type(), EntryType::Otp);
    assert_eq!(client.read(&listed[0]).unwrap().password, "JBSWY3DPEHPK3PXP");
}

// ---------------------------------------------------------------------------
// Listing and the tag protocol
// ---------------------------------------------------------------------------

#[test]
fn list_filters_by_substring_and_keeps_types() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    client.write(&mut account("github", "a", "b")).unwrap();
    client.write(&mut account("gitlab", "a", "b")).unwrap();
    client.write(&mut account("bank", "a", "b")).unwrap();
    client
        .write(&mut DecodedEntry::new("github", EntryType::Otp).unwrap())
        .unwrap();

    let mut all = base_names(&client.list("").unwrap());
    all.sort();
    assert_eq!(all, vec!["bank", "github", "github", "gitlab"]);

    let mut git = base_names(&client.list("git").unwrap());
    git.sort();
    assert_eq!(git, vec!["github", "github", "gitlab"]);

    let otp: Vec<_> = client
        .list("hub")
        .unwrap()
        .into_iter()
        .filter(|n| n.entry_type() == EntryType::Otp)
        .collect();
    assert_eq!(otp.len(), 1);

    assert!(client.list("nothing").unwrap().is_empty());
}

#[test]
fn list_on_empty_store_is_empty() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);
    assert!(client.list("").unwrap().is_empty());
    assert!(!client.has_local_update());
}

#[test]
fn other_clients_write_invalidates_listing() {
    let backend = MemoryTransport::new(TOKEN);
    let mut a = client(&backend);
    let mut b = client(&backend);

    a.write(&mut account("first", "u", "p")).unwrap();

    // Settle B: initial fetch, then learn the current tag.
    b.list("").unwrap();
    b.list("").unwrap();
    assert!(!b.has_local_update());
    assert_eq!(b.cached_tag(), a.cached_tag());

    // Nothing changed: B answers from its cache after one tag GET.
    backend.clear_requests();
    assert_eq!(base_names(&b.list("").unwrap()), vec!["first"]);
    assert_eq!(backend.requests(), vec![(Method::Get, "/updated".to_string())]);

    // A writes X; B's stale tag no longer matches.
    a.write(&mut account("X", "u", "p")).unwrap();
    backend.clear_requests();

    let mut names = base_names(&b.list("").unwrap());
    names.sort();
    assert_eq!(names, vec!["X", "first"]);
    assert_eq!(
        backend.requests(),
        vec![
            (Method::Get, "/updated".to_string()),
            (Method::List, String::new()),
        ]
    );
    assert_eq!(b.cached_tag(), a.cached_tag());
}

#[test]
fn own_write_skips_tag_check() {
    let backend = MemoryTransport::new(TOKEN);
    let mut a = client(&backend);

    a.list("").unwrap();
    a.write(&mut account("X", "u", "p")).unwrap();
    assert!(a.has_local_update());

    backend.clear_requests();
    assert_eq!(base_names(&a.list("").unwrap()), vec!["X"]);

    assert_eq!(backend.requests(), vec![(Method::List, String::new())]);
    assert!(!a.has_local_update());
}

#[test]
fn update_tag_publishes_random_alphanumeric_tag() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    client.update_tag().unwrap();
    let first = backend.raw("updated").unwrap()["tag"]
        .as_str()
        .unwrap()
        .to_string();
    assert_eq!(first.len(), TAG_LEN);
    assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_eq!(client.cached_tag(), first);

    client.update_tag().unwrap();
    assert_ne!(client.cached_tag(), first);
}

#[test]
fn is_tag_updated_records_remote_tag() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);
    client.list("").unwrap();

    backend.insert_raw("updated", json!({ "tag": "remote-tag" }));
    assert!(client.is_tag_updated().unwrap());
    assert_eq!(client.cached_tag(), "remote-tag");
    assert!(!client.is_tag_updated().unwrap());
}

#[test]
fn foreign_and_corrupt_keys_are_dropped() {
    let backend = MemoryTransport::new(TOKEN);
    let mut ours = client(&backend);
    ours.write(&mut account("mine", "u", "p")).unwrap();

    let stranger = Lock::new(b"another password", &SALT, KdfAlgorithm::Pbkdf2Sha256).unwrap();
    let foreign = stranger.encrypt_and_encode_hex("theirs").unwrap();
    backend.insert_raw(&foreign, json!({ "encrypted": "" }));
    backend.insert_raw("not-hex-at-all", json!({ "encrypted": "" }));
    let empty = ours.lock().encrypt_and_encode_hex("__file").unwrap();
    backend.insert_raw(&empty, json!({ "encrypted": "" }));

    assert_eq!(base_names(&ours.list("").unwrap()), vec!["mine"]);
}

#[test]
fn network_failure_during_tag_check_serves_cached_listing() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);
    client.write(&mut account("github", "u", "p")).unwrap();
    client.list("").unwrap();

    backend.set_offline(true);
    assert_eq!(base_names(&client.list("").unwrap()), vec!["github"]);
}

#[test]
fn failed_refresh_is_retried_on_next_list() {
    let backend = MemoryTransport::new(TOKEN);
    let mut a = client(&backend);
    let mut b = client(&backend);

    a.write(&mut account("first", "u", "p")).unwrap();
    b.list("").unwrap();
    b.list("").unwrap();
    assert!(!b.has_local_update());

    a.write(&mut account("X", "u", "p")).unwrap();

    // B sees the new tag, but the LIST that follows times out.
    backend.fail_next(Method::List);
    let result = b.list("");
    assert!(matches!(result, Err(PassError::Network(_))));
    assert!(b.has_local_update());

    let mut names = base_names(&b.list("").unwrap());
    names.sort();
    assert_eq!(names, vec!["X", "first"]);
    assert!(!b.has_local_update());
}

#[test]
fn refresh_after_failure_ignores_unchanged_tag() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);
    client.write(&mut account("github", "u", "p")).unwrap();
    client.list("").unwrap();

    backend.insert_raw("updated", json!({ "tag": "someone-else" }));
    backend.fail_next(Method::List);
    assert!(client.list("").is_err());

    // Tag unchanged since the failure, yet the listing is fetched again.
    backend.clear_requests();
    assert_eq!(base_names(&client.list("").unwrap()), vec!["github"]);
    assert_eq!(backend.requests(), vec![(Method::List, String::new())]);
}

#[test]
fn network_failure_during_fetch_is_propagated() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);
    client.write(&mut account("github", "u", "p")).unwrap();

    // Our own write skips the tag check, so the LIST itself fails.
    backend.set_offline(true);
    let result = client.list("");
    assert!(matches!(result, Err(PassError::Network(_))));
    assert!(client.has_local_update());
}

#[test]
fn wrong_token_surfaces_vault_error() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = VaultClient::new(lock(), backend.clone());

    let result = client.list("");
    match result {
        Err(PassError::Vault(msg)) => assert!(msg.contains("permission denied")),
        other => panic!("expected a Vault error, got {other:?}"),
    }

    let result = client.write(&mut account("x", "u", "p"));
    assert!(matches!(result, Err(PassError::Vault(_))));
}

#[test]
fn unlock_with_wrong_password_fails() {
    let backend = MemoryTransport::new(TOKEN);
    let sealed = lock().seal_token(TOKEN).unwrap();

    let wrong = Lock::new(b"wrong", &SALT, KdfAlgorithm::Pbkdf2Sha256).unwrap();
    let mut client = VaultClient::new(wrong, backend);
    assert!(matches!(
        client.unlock(&sealed.token),
        Err(PassError::DecryptionFailed)
    ));
}

// ---------------------------------------------------------------------------
// Entry names
// ---------------------------------------------------------------------------

#[test]
fn names_ending_in_a_type_suffix_are_rejected() {
    for suffix in ["__otp", "__file", "__sign"] {
        let name = format!("foo{suffix}");
        let result = DecodedEntry::new(&name, EntryType::Account);
        assert!(matches!(result, Err(PassError::InvalidName(_))), "{name}");
    }
}

#[test]
fn empty_names_are_rejected() {
    assert!(matches!(
        DecodedEntry::new("", EntryType::Otp),
        Err(PassError::InvalidName(_))
    ));

    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);
    let mut entry = account("x", "u", "p");
    entry.name = Name::default();

    let result = client.write(&mut entry);
    assert!(matches!(result, Err(PassError::InvalidName(_))));
    assert!(backend.requests().is_empty());
    assert_eq!(backend.key_count(), 0);
}

#[test]
fn written_names_round_trip_through_listing() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    for entry_type in EntryType::ALL {
        let mut entry = DecodedEntry::new("shared", entry_type).unwrap();
        client.write(&mut entry).unwrap();
    }

    let listed = client.list("").unwrap();
    let mut types: Vec<_> = listed.iter().map(|n| n.entry_type().to_string()).collect();
    types.sort();
    assert_eq!(types, vec!["account", "file", "otp", "sign"]);
    assert!(listed.iter().all(|n| n.base_name() == "shared"));
}

#[test]
fn failed_write_leaves_new_entry_unstored() {
    let backend = MemoryTransport::new(TOKEN);
    let mut client = client(&backend);

    let mut entry = account("github", "u", "p");
    backend.fail_next(Method::Put);
    assert!(client.write(&mut entry).is_err());
    assert!(!entry.name.is_stored());

    client.write(&mut entry).unwrap();
    assert!(entry.name.is_stored());
    assert_eq!(base_names(&client.list("").unwrap()), vec!["github"]);
}

// ---------------------------------------------------------------------------
// Padding
// ---------------------------------------------------------------------------

#[test]
fn short_entries_are_padded_to_the_floor() {
    let entry = account("x", "a", "b");
    assert_eq!(padding_length(&entry), MINIMUM_DATA_LENGTH - 2);

    let payload = encode_payload(&entry).unwrap();
    assert!(payload.len() >= MINIMUM_DATA_LENGTH);

    let parsed: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    let padding = parsed["padding"].as_str().unwrap();
    assert_eq!(padding.len(), MINIMUM_DATA_LENGTH - 2);
}

#[test]
fn large_entries_get_no_padding() {
    let mut entry = account("x", "", "b");
    entry.file = vec![0u8; MINIMUM_DATA_LENGTH];
    assert_eq!(padding_length(&entry), 0);

    let parsed: serde_json::Value =
        serde_json::from_slice(&encode_payload(&entry).unwrap()).unwrap();
    assert_eq!(parsed["padding"], "");
}

#[test]
fn padding_counts_username_twice() {
    let entry = account("x", &"u".repeat(40), "");
    assert_eq!(padding_length(&entry), MINIMUM_DATA_LENGTH - 80);
}
