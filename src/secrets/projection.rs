//! Display-safe projection of containers
//!
//! Printable values are rendered as text; anything else is replaced by
//! [`BINARY_MARKER`]. Raw bytes always travel alongside.

use std::collections::BTreeMap;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

use crate::container::{Container, ContainerData};

/// Text rendering used for values that are not printable ASCII
pub const BINARY_MARKER: &str = "[Binary Data]";

/// Read-only view of a container for output
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Projection {
    #[serde(rename = "Name")]
    pub name: String,

    #[serde(rename = "Type")]
    pub kind: String,

    /// Raw values, serialized as base64
    #[serde(rename = "Data", serialize_with = "serialize_raw")]
    pub raw: ContainerData,

    /// Text renderings
    #[serde(rename = "StringData")]
    pub text: BTreeMap<String, String>,

    #[serde(rename = "CreatedAt")]
    pub created_at: Option<DateTime<Utc>>,
}

/// True if every byte is in the printable range `[32, 127)`
pub fn is_printable(value: &[u8]) -> bool {
    value.iter().all(|&b| (32..127).contains(&b))
}

/// Text rendering of a single value
pub fn render(value: &[u8]) -> String {
    if is_printable(value) {
        // printable ASCII is always valid UTF-8
        String::from_utf8_lossy(value).into_owned()
    } else {
        BINARY_MARKER.to_string()
    }
}

/// Project a container
pub fn project(container: &Container) -> Projection {
    Projection::from(container)
}

impl From<&Container> for Projection {
    fn from(container: &Container) -> Self {
        let text = container
            .data
            .iter()
            .map(|(key, value)| (key.clone(), render(value)))
            .collect();

        Self {
            name: container.name.clone(),
            kind: container.kind.clone(),
            raw: container.data.clone(),
            text,
            created_at: container.created_at,
        }
    }
}

impl From<Container> for Projection {
    fn from(container: Container) -> Self {
        Projection::from(&container)
    }
}

fn serialize_raw<S: Serializer>(raw: &ContainerData, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(raw.iter().map(|(key, value)| (key, STANDARD.encode(value))))
}
