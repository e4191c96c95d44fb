//! Namespaced container registry
//!
//! Plain in-memory state shared by [`MemoryStore`](super::MemoryStore) and
//! the server [`Engine`](crate::engine::Engine). Callers provide locking.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::container::{Container, DEFAULT_KIND};
use crate::error::{Error, Result};

/// namespace → name → container
#[derive(Debug, Default)]
pub struct Registry {
    namespaces: BTreeMap<String, BTreeMap<String, Container>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Containers of a namespace ordered by name; unknown namespaces are empty
    pub fn list(&self, namespace: &str) -> Vec<Container> {
        self.namespaces
            .get(namespace)
            .map(|containers| containers.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Borrowing view of a namespace in [`list`](Self::list) order
    pub fn containers<'a>(&'a self, namespace: &str) -> impl Iterator<Item = &'a Container> + 'a {
        self.namespaces
            .get(namespace)
            .into_iter()
            .flat_map(|containers| containers.values())
    }

    /// Container named exactly `name` in `namespace`
    pub fn get(&self, namespace: &str, name: &str) -> Option<&Container> {
        self.namespaces.get(namespace).and_then(|containers| containers.get(name))
    }

    /// Container as it would be stored by a create, without storing it
    ///
    /// Kind defaults to [`DEFAULT_KIND`]; creation time is always `now`.
    pub fn prepare_create(
        &self,
        namespace: &str,
        mut container: Container,
        now: DateTime<Utc>,
    ) -> Result<Container> {
        if self.get(namespace, &container.name).is_some() {
            return Err(Error::AlreadyExists(container.name));
        }
        if container.kind.is_empty() {
            container.kind = DEFAULT_KIND.to_string();
        }
        container.created_at = Some(now);
        Ok(container)
    }

    /// Container as it would be stored by an update, without storing it
    ///
    /// Data is replaced wholesale. Creation time always stays the stored
    /// one; kind is kept unless the update names a new one.
    pub fn prepare_update(&self, namespace: &str, container: Container) -> Result<Container> {
        let stored = self
            .get(namespace, &container.name)
            .ok_or_else(|| Error::ContainerMissing(container.name.clone()))?;

        let kind = if container.kind.is_empty() {
            stored.kind.clone()
        } else {
            container.kind
        };
        Ok(Container {
            name: stored.name.clone(),
            kind,
            created_at: stored.created_at,
            data: container.data,
        })
    }

    /// Insert a new container
    pub fn create(
        &mut self,
        namespace: &str,
        container: Container,
        now: DateTime<Utc>,
    ) -> Result<Container> {
        let created = self.prepare_create(namespace, container, now)?;
        self.restore(namespace, created.clone());
        Ok(created)
    }

    /// Replace the data of an existing container
    pub fn update(&mut self, namespace: &str, container: Container) -> Result<Container> {
        let updated = self.prepare_update(namespace, container)?;
        self.restore(namespace, updated.clone());
        Ok(updated)
    }

    /// Remove a container by exact name
    pub fn delete(&mut self, namespace: &str, name: &str) -> Result<Container> {
        let containers = self
            .namespaces
            .get_mut(namespace)
            .ok_or_else(|| Error::ContainerMissing(name.to_string()))?;
        let removed = containers
            .remove(name)
            .ok_or_else(|| Error::ContainerMissing(name.to_string()))?;
        if containers.is_empty() {
            self.namespaces.remove(namespace);
        }
        Ok(removed)
    }

    /// Insert or overwrite verbatim (WAL replay)
    pub fn restore(&mut self, namespace: &str, container: Container) {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .insert(container.name.clone(), container);
    }

    /// Remove if present (WAL replay)
    pub fn forget(&mut self, namespace: &str, name: &str) {
        let _ = self.delete(namespace, name);
    }

    /// Every (namespace, container) pair
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Container)> {
        self.namespaces
            .iter()
            .flat_map(|(ns, containers)| containers.values().map(move |c| (ns.as_str(), c)))
    }

    /// Total number of containers across namespaces
    pub fn len(&self) -> usize {
        self.namespaces.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }
}
