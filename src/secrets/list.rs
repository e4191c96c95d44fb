//! Listing with case-insensitive filters

use crate::error::Result;
use crate::store::ContainerStore;

use super::projection::Projection;

/// List the containers of `namespace` whose names match any filter
///
/// A filter matches when it is a case-insensitive substring of the name
/// (which covers equality). No filters match everything. Results keep the
/// store's enumeration order.
pub fn list<S, F>(store: &S, namespace: &str, filters: &[F]) -> Result<Vec<Projection>>
where
    S: ContainerStore + ?Sized,
    F: AsRef<str>,
{
    let containers = store.list(namespace)?;
    let filters: Vec<String> = filters.iter().map(|f| f.as_ref().to_lowercase()).collect();

    let projections: Vec<Projection> = containers
        .iter()
        .filter(|c| matches_filters(&c.name, &filters))
        .map(Projection::from)
        .collect();

    tracing::debug!(
        namespace,
        total = containers.len(),
        matched = projections.len(),
        "listed containers"
    );
    Ok(projections)
}

/// `filters` must already be lowercased
fn matches_filters(name: &str, filters: &[String]) -> bool {
    if filters.is_empty() {
        return true;
    }
    let name = name.to_lowercase();
    filters.iter().any(|f| name == *f || name.contains(f.as_str()))
}
