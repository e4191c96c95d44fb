//! Compound address parsing
//!
//! `container.key` → (`container`, `key`), split at the first dot only.

use crate::error::{Error, Result};

/// A parsed compound address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    /// Container name, never empty
    pub container: String,

    /// Key within the container; empty means the whole container
    pub key: String,
}

impl Address {
    /// Parse a raw address
    ///
    /// Surrounding whitespace is trimmed first. Everything after the first
    /// `.` is the key and may itself contain dots.
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (container, key) = match trimmed.split_once('.') {
            Some((container, key)) => (container, key),
            None => (trimmed, ""),
        };

        if container.is_empty() {
            return Err(Error::InvalidName(raw.to_string()));
        }

        Ok(Self {
            container: container.to_string(),
            key: key.to_string(),
        })
    }

    /// Parse an address that must name a single key
    pub fn parse_key(raw: &str) -> Result<Self> {
        let address = Self::parse(raw)?;
        if !address.has_key() {
            return Err(Error::InvalidName(raw.to_string()));
        }
        Ok(address)
    }

    /// Whether a key is selected
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }
}
