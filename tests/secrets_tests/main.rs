//! Tests for per-key secrets operations
//!
//! These tests verify, against an in-memory store:
//! - Filtered listing
//! - Set: create-on-miss, merge, overwrite, case-insensitive lookup
//! - Delete: whole container, single key, missing key no-op, NotFound
//! - Which store calls each operation issues
//! - Store enumeration order and first-match-wins on unsorted stores

mod delete_tests;

use std::collections::BTreeMap;

use kvsecrets::error::{Error, Result};
use kvsecrets::{Container, ContainerData, ContainerStore, MemoryStore};
use parking_lot::Mutex;

// =============================================================================
// Helper Functions
// =============================================================================

/// A store call, as seen by [`RecordingStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List(String),
    Create(String, String),
    Update(String, String),
    Delete(String, String),
}

/// MemoryStore wrapper that records every call
#[derive(Default)]
pub struct RecordingStore {
    pub inner: MemoryStore,
    pub calls: Mutex<Vec<Call>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

impl ContainerStore for RecordingStore {
    fn list(&self, namespace: &str) -> Result<Vec<Container>> {
        self.calls.lock().push(Call::List(namespace.to_string()));
        self.inner.list(namespace)
    }

    fn create(&self, namespace: &str, container: Container) -> Result<Container> {
        self.calls
            .lock()
            .push(Call::Create(namespace.to_string(), container.name.clone()));
        self.inner.create(namespace, container)
    }

    fn update(&self, namespace: &str, container: Container) -> Result<Container> {
        self.calls
            .lock()
            .push(Call::Update(namespace.to_string(), container.name.clone()));
        self.inner.update(namespace, container)
    }

    fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.calls
            .lock()
            .push(Call::Delete(namespace.to_string(), name.to_string()));
        self.inner.delete(namespace, name)
    }
}

/// Store that lists containers in insertion order, not by name
///
/// Names are unique by exact match only, so `DB` and `db` can coexist.
#[derive(Default)]
pub struct OrderedStore {
    containers: Mutex<Vec<Container>>,
}

impl OrderedStore {
    pub fn with(names: &[&str]) -> Self {
        let store = Self::default();
        for name in names {
            store
                .create("default", Container::new(*name, data(&[("origin", *name)])))
                .unwrap();
        }
        store
    }

    pub fn names(&self) -> Vec<String> {
        self.containers.lock().iter().map(|c| c.name.clone()).collect()
    }
}

impl ContainerStore for OrderedStore {
    fn list(&self, _namespace: &str) -> Result<Vec<Container>> {
        Ok(self.containers.lock().clone())
    }

    fn create(&self, _namespace: &str, container: Container) -> Result<Container> {
        let mut containers = self.containers.lock();
        if containers.iter().any(|c| c.name == container.name) {
            return Err(Error::AlreadyExists(container.name));
        }
        containers.push(container.clone());
        Ok(container)
    }

    fn update(&self, _namespace: &str, container: Container) -> Result<Container> {
        let mut containers = self.containers.lock();
        let slot = containers
            .iter_mut()
            .find(|c| c.name == container.name)
            .ok_or_else(|| Error::ContainerMissing(container.name.clone()))?;
        *slot = container.clone();
        Ok(container)
    }

    fn delete(&self, _namespace: &str, name: &str) -> Result<()> {
        let mut containers = self.containers.lock();
        let index = containers
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| Error::ContainerMissing(name.to_string()))?;
        containers.remove(index);
        Ok(())
    }
}

pub fn data(pairs: &[(&str, &str)]) -> ContainerData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
        .collect()
}

/// Seed `store` with a container directly, bypassing the operations under test
pub fn seed<S: ContainerStore>(store: &S, namespace: &str, name: &str, pairs: &[(&str, &str)]) {
    store
        .create(namespace, Container::new(name, data(pairs)))
        .unwrap();
}

/// Stored data of the container named exactly `name`
pub fn stored<S: ContainerStore>(store: &S, namespace: &str, name: &str) -> Option<ContainerData> {
    store
        .list(namespace)
        .unwrap()
        .into_iter()
        .find(|c| c.name == name)
        .map(|c| c.data)
}

pub fn text(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
