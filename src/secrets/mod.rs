//! Secrets Module
//!
//! Per-key addressing on top of a store that only reads and writes whole
//! containers.
//!
//! ## Operations
//! - [`list`]: containers of a namespace, optionally filtered
//! - [`set`]: get-or-create a container, then merge one key into it
//! - [`delete`]: remove one key, or the whole container
//!
//! Every operation lists the namespace fresh and finds its container with a
//! case-insensitive linear scan; nothing is cached between calls. Results
//! are returned as [`Projection`]s.

mod delete;
mod list;
mod name;
mod projection;
mod set;
mod value;

pub use delete::delete;
pub use list::list;
pub use name::Address;
pub use projection::{is_printable, project, render, Projection, BINARY_MARKER};
pub use set::{set, set_encoded};
pub use value::{decode_value, ValueEncoding};

use crate::container::Container;

/// First container whose name equals `name` ignoring case
pub(crate) fn find_container<'a>(containers: &'a [Container], name: &str) -> Option<&'a Container> {
    containers.iter().find(|c| c.name_matches(name))
}
