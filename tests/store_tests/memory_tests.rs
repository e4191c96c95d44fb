use kvsecrets::error::Error;
use kvsecrets::{Container, ContainerStore, MemoryStore};

use super::data;

#[test]
fn test_memory_store_contract() {
    let store = MemoryStore::new();

    let created = store
        .create("ns", Container::new("db", data(&[("user", "admin")])))
        .unwrap();
    assert!(created.created_at.is_some());
    assert_eq!(store.len(), 1);

    let updated = store
        .update("ns", Container::new("db", data(&[("user", "root")])))
        .unwrap();
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(store.list("ns").unwrap(), vec![updated]);

    store.delete("ns", "db").unwrap();
    assert!(store.is_empty());
    assert!(matches!(store.delete("ns", "db"), Err(Error::ContainerMissing(_))));
}

#[test]
fn test_memory_store_returns_copies() {
    let store = MemoryStore::new();
    store
        .create("ns", Container::new("db", data(&[("user", "admin")])))
        .unwrap();

    let mut listed = store.list("ns").unwrap();
    listed[0].data.clear();

    assert_eq!(store.list("ns").unwrap()[0].data, data(&[("user", "admin")]));
}
