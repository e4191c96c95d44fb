//! Delete a key or a whole container

use crate::error::{Error, Result};
use crate::store::ContainerStore;

use super::name::Address;
use super::projection::Projection;
use super::find_container;

/// Delete `address` within `namespace`
///
/// Without a key the whole container is deleted and its last snapshot is
/// returned. With a key only that entry is removed; the container stays
/// even when its data becomes empty. A key that does not exist is a no-op
/// returning the container unchanged.
pub fn delete<S>(store: &S, namespace: &str, address: &str) -> Result<Projection>
where
    S: ContainerStore + ?Sized,
{
    let Address { container, key } = Address::parse(address)?;

    let containers = store.list(namespace)?;
    let existing = find_container(&containers, &container)
        .ok_or_else(|| Error::NotFound(container.clone()))?;

    if key.is_empty() {
        tracing::debug!(namespace, container = %existing.name, "deleting container");
        store.delete(namespace, &existing.name)?;
        return Ok(Projection::from(existing));
    }

    if !existing.data.contains_key(&key) {
        tracing::debug!(
            namespace,
            container = %existing.name,
            %key,
            "key absent, nothing to delete"
        );
        return Ok(Projection::from(existing));
    }

    let mut data = existing.data.clone();
    data.remove(&key);
    tracing::debug!(namespace, container = %existing.name, %key, "removing key");
    let updated = store.update(namespace, existing.with_data(data))?;

    Ok(Projection::from(&updated))
}
