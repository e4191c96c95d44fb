//! Container Store Module
//!
//! The minimal contract the core needs from a backend: whole containers
//! are listed, created, replaced, and deleted. There is no per-key access
//! and no partial update.
//!
//! ## Implementations
//! - [`MemoryStore`]: in-process, for tests and embedding
//! - [`RemoteStore`]: TCP client for `kvsecrets-server`
//! - [`Engine`](crate::engine::Engine): the server's WAL-backed store

mod memory;
mod registry;
mod remote;

pub use memory::MemoryStore;
pub use registry::Registry;
pub use remote::RemoteStore;

use crate::container::Container;
use crate::error::Result;

/// Backend contract for namespaced containers
pub trait ContainerStore {
    /// All containers of a namespace, in store enumeration order
    fn list(&self, namespace: &str) -> Result<Vec<Container>>;

    /// Create a container; fails with `AlreadyExists` if the exact name is taken
    fn create(&self, namespace: &str, container: Container) -> Result<Container>;

    /// Replace a container's data wholesale; fails with `ContainerMissing`
    fn update(&self, namespace: &str, container: Container) -> Result<Container>;

    /// Delete a container by exact name; fails with `ContainerMissing`
    fn delete(&self, namespace: &str, name: &str) -> Result<()>;
}

impl<S: ContainerStore + ?Sized> ContainerStore for &S {
    fn list(&self, namespace: &str) -> Result<Vec<Container>> {
        (**self).list(namespace)
    }

    fn create(&self, namespace: &str, container: Container) -> Result<Container> {
        (**self).create(namespace, container)
    }

    fn update(&self, namespace: &str, container: Container) -> Result<Container> {
        (**self).update(namespace, container)
    }

    fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        (**self).delete(namespace, name)
    }
}
