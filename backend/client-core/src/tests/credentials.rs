// Unit tests for the credential store

use crate::credentials::{CredentialStore, StoredCredentials};
use crate::error::credentials::CredentialsError;

use tempfile::TempDir;

fn store_in_tempdir() -> (TempDir, CredentialStore) {
    let dir = TempDir::new().expect("tempdir");
    let store = CredentialStore::new(dir.path());
    (dir, store)
}

#[test]
fn given_no_file_when_loaded_then_defaults() {
    let (_dir, store) = store_in_tempdir();

    let credentials = store.load().expect("missing file loads as defaults");

    assert_eq!(credentials, StoredCredentials::default());
    assert_eq!(credentials.password, None);
    assert_eq!(credentials.pager_address, None);
}

/// **VALUE**: Verifies a save/load round trip through the JSON file.
#[test]
fn given_saved_credentials_when_loaded_then_values_round_trip() {
    // GIVEN: A store with both values saved
    let (_dir, store) = store_in_tempdir();
    let credentials = StoredCredentials {
        password: Some(String::from("swordfish")),
        pager_address: Some(133701),
    };
    store.save(&credentials).expect("save");

    // WHEN: Loading them back
    let loaded = store.load().expect("load");

    // THEN: Both values survive
    assert_eq!(loaded, credentials);
}

/// **VALUE**: Verifies `store_password` keeps the stored pager address and
/// `store_address` keeps the stored secret.
///
/// **WHY THIS MATTERS**: Authentication and page submission persist their
/// fields independently. A write that serializes only its own field would
/// wipe the other on every page sent.
///
/// **BUG THIS CATCHES**: Would catch a `save(&StoredCredentials {
/// password, ..Default::default() })` style write.
#[test]
fn given_existing_values_when_one_field_stored_then_other_survives() {
    // GIVEN: A store with an address persisted
    let (_dir, store) = store_in_tempdir();
    store.store_address(42).expect("store address");

    // WHEN: Persisting a secret afterwards
    store.store_password("hunter2").expect("store password");

    // THEN: Both values are present
    let loaded = store.load().expect("load");
    assert_eq!(loaded.password.as_deref(), Some("hunter2"));
    assert_eq!(loaded.pager_address, Some(42));

    // AND: Updating the address keeps the secret
    store.store_address(7).expect("store address");
    let loaded = store.load().expect("load");
    assert_eq!(loaded.password.as_deref(), Some("hunter2"));
    assert_eq!(loaded.pager_address, Some(7));
}

/// **VALUE**: Verifies corrupt files surface as a parse error, while the
/// tolerant read degrades them to defaults.
#[test]
fn given_corrupt_file_when_loaded_then_parse_error_and_tolerant_default() {
    // GIVEN: A credentials file holding junk
    let (dir, store) = store_in_tempdir();
    std::fs::write(dir.path().join("credentials.json"), "{not json").expect("write junk");

    // WHEN/THEN: The strict load reports the parse failure
    assert!(matches!(
        store.load(),
        Err(CredentialsError::ParseError { .. })
    ));

    // AND: The tolerant load starts clean
    assert_eq!(store.load_or_default(), StoredCredentials::default());
}

/// **VALUE**: Verifies writes recover from a corrupt existing file instead
/// of failing.
#[test]
fn given_corrupt_file_when_stored_then_overwritten() {
    let (dir, store) = store_in_tempdir();
    std::fs::write(dir.path().join("credentials.json"), "][").expect("write junk");

    store.store_password("fresh").expect("store over junk");

    let loaded = store.load().expect("load");
    assert_eq!(loaded.password.as_deref(), Some("fresh"));
}

#[test]
fn given_missing_directory_when_saved_then_created() {
    let dir = TempDir::new().expect("tempdir");
    let nested = dir.path().join("a").join("b");
    let store = CredentialStore::new(&nested);

    store.store_address(9).expect("save into missing directory");

    assert!(nested.join("credentials.json").exists());
}

/// **VALUE**: Verifies unknown fields in the file are tolerated, so older
/// builds can read files written by newer ones.
#[test]
fn given_file_with_extra_fields_when_loaded_then_known_fields_read() {
    let (dir, store) = store_in_tempdir();
    std::fs::write(
        dir.path().join("credentials.json"),
        r#"{"password": "pw", "pager_address": 3, "theme": "dark"}"#,
    )
    .expect("write");

    let loaded = store.load().expect("load");

    assert_eq!(loaded.password.as_deref(), Some("pw"));
    assert_eq!(loaded.pager_address, Some(3));
}
