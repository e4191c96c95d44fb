//! In-process container store

use chrono::Utc;
use parking_lot::RwLock;

use super::registry::Registry;
use super::ContainerStore;
use crate::container::Container;
use crate::error::Result;

/// Container store held entirely in memory
///
/// Lists take the read lock; create/update/delete take the write lock.
#[derive(Debug, Default)]
pub struct MemoryStore {
    registry: RwLock<Registry>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of containers across namespaces
    pub fn len(&self) -> usize {
        self.registry.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }
}

impl ContainerStore for MemoryStore {
    fn list(&self, namespace: &str) -> Result<Vec<Container>> {
        Ok(self.registry.read().list(namespace))
    }

    fn create(&self, namespace: &str, container: Container) -> Result<Container> {
        self.registry.write().create(namespace, container, Utc::now())
    }

    fn update(&self, namespace: &str, container: Container) -> Result<Container> {
        self.registry.write().update(namespace, container)
    }

    fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        self.registry.write().delete(namespace, name).map(|_| ())
    }
}
