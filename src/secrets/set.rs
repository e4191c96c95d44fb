//! Set one key: get-or-create, then merge

use crate::container::{Container, ContainerData};
use crate::error::Result;
use crate::store::ContainerStore;

use super::find_container;
use super::name::Address;
use super::projection::Projection;
use super::value::{decode_value, ValueEncoding};

/// Set `address`'s key to `value` within `namespace`
///
/// 1. Parse the address; both container and key must be present
/// 2. List the namespace and find the container case-insensitively
/// 3. Found: copy its data, insert the key, replace the data wholesale
///    under the stored name
/// 4. Not found: create a container named exactly as given holding only
///    the new key
/// 5. Project what the store returned
///
/// List and write are separate round-trips; a concurrent writer between
/// them is silently overwritten.
pub fn set<S>(store: &S, namespace: &str, address: &str, value: Vec<u8>) -> Result<Projection>
where
    S: ContainerStore + ?Sized,
{
    let Address { container, key } = Address::parse_key(address)?;

    let containers = store.list(namespace)?;
    let written = match find_container(&containers, &container) {
        Some(existing) => {
            let mut data = existing.data.clone();
            data.insert(key, value);
            tracing::debug!(namespace, container = %existing.name, "updating container");
            store.update(namespace, existing.with_data(data))?
        }
        None => {
            let mut data = ContainerData::new();
            data.insert(key, value);
            tracing::debug!(namespace, %container, "creating container");
            store.create(namespace, Container::new(container, data))?
        }
    };

    Ok(Projection::from(&written))
}

/// Decode a command-line value, then connect and [`set`] it
///
/// `connect` is only called once `value` has decoded, so a malformed value
/// never costs a backend round-trip.
pub fn set_encoded<S, C>(
    connect: C,
    namespace: &str,
    address: &str,
    value: &str,
    encoding: ValueEncoding,
) -> Result<Projection>
where
    S: ContainerStore,
    C: FnOnce() -> Result<S>,
{
    let value = decode_value(value, encoding)?;
    let store = connect()?;
    set(&store, namespace, address, value)
}
