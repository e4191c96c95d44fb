use kvsecrets::error::Error;
use kvsecrets::secrets;
use kvsecrets::MemoryStore;

use super::{data, seed, stored, text, Call, RecordingStore};

#[test]
fn test_delete_whole_container_returns_snapshot() {
    let store = MemoryStore::new();
    seed(&store, "default", "db", &[("user", "admin")]);

    let projection = secrets::delete(&store, "default", "db").unwrap();

    assert_eq!(projection.name, "db");
    assert_eq!(projection.text, text(&[("user", "admin")]));
    assert!(stored(&store, "default", "db").is_none());
}

#[test]
fn test_delete_whole_container_case_insensitive() {
    let store = RecordingStore::new();
    seed(&store, "default", "Database", &[]);
    store.clear_calls();

    secrets::delete(&store, "default", "DATABASE").unwrap();

    assert_eq!(
        store.calls(),
        vec![
            Call::List("default".into()),
            Call::Delete("default".into(), "Database".into()),
        ]
    );
    assert!(store.inner.is_empty());
}

#[test]
fn test_delete_key_keeps_other_keys() {
    let store = MemoryStore::new();
    seed(&store, "default", "db", &[("user", "admin"), ("password", "hunter2")]);

    let projection = secrets::delete(&store, "default", "db.password").unwrap();

    assert_eq!(projection.text, text(&[("user", "admin")]));
    assert_eq!(stored(&store, "default", "db"), Some(data(&[("user", "admin")])));
}

#[test]
fn test_delete_last_key_keeps_empty_container() {
    let store = MemoryStore::new();
    seed(&store, "default", "db", &[("user", "admin")]);

    let projection = secrets::delete(&store, "default", "db.user").unwrap();

    assert!(projection.text.is_empty());
    let listed = secrets::list(&store, "default", &["db"]).unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].raw.is_empty());
}

#[test]
fn test_delete_missing_key_is_noop() {
    let store = RecordingStore::new();
    seed(&store, "default", "db", &[("user", "admin")]);
    store.clear_calls();

    let projection = secrets::delete(&store, "default", "db.nothing").unwrap();

    assert_eq!(projection.text, text(&[("user", "admin")]));
    // only the lookup, no write
    assert_eq!(store.calls(), vec![Call::List("default".into())]);
}

#[test]
fn test_delete_missing_container_is_not_found() {
    let store = MemoryStore::new();
    seed(&store, "default", "db", &[]);

    assert!(matches!(
        secrets::delete(&store, "default", "cache"),
        Err(Error::NotFound(_))
    ));
    assert!(matches!(
        secrets::delete(&store, "default", "cache.key"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_delete_other_namespace_is_not_found() {
    let store = MemoryStore::new();
    seed(&store, "prod", "db", &[]);

    assert!(matches!(
        secrets::delete(&store, "dev", "db"),
        Err(Error::NotFound(_))
    ));
}

#[test]
fn test_delete_invalid_name() {
    let store = RecordingStore::new();

    for address in ["", "  ", ".key"] {
        assert!(matches!(
            secrets::delete(&store, "default", address),
            Err(Error::InvalidName(_))
        ));
    }
    assert!(store.calls().is_empty());
}
