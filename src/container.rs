//! Container definitions
//!
//! A container is the unit the store persists: a named map of raw byte
//! values that is always read and written whole.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind assigned by the store when a container is created without one
pub const DEFAULT_KIND: &str = "Opaque";

/// Key name → raw value bytes
pub type ContainerData = BTreeMap<String, Vec<u8>>;

/// A named blob container within a namespace
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
    /// Name, unique within its namespace; casing is preserved as stored
    pub name: String,

    /// Opaque classification string
    pub kind: String,

    /// Creation time, assigned by the store
    pub created_at: Option<DateTime<Utc>>,

    /// Key → raw bytes
    pub data: ContainerData,
}

impl Container {
    /// Create a container with no kind and no creation time; the store fills both
    pub fn new(name: impl Into<String>, data: ContainerData) -> Self {
        Self {
            name: name.into(),
            kind: String::new(),
            created_at: None,
            data,
        }
    }

    /// Copy of this container carrying `data` instead of its own map
    pub fn with_data(&self, data: ContainerData) -> Self {
        Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            created_at: self.created_at,
            data,
        }
    }

    /// Case-insensitive name comparison
    pub fn name_matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}
