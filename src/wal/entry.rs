//! WAL Entry definitions
//!
//! Defines the structure of individual WAL log entries.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::error::{Error, Result};

/// Header size: LSN (8) + CRC (4) + Len (4)
pub const HEADER_SIZE: usize = 16;

/// Largest entry body accepted when reading (64 MB)
pub const MAX_ENTRY_SIZE: usize = 64 * 1024 * 1024;

/// A single entry in the WAL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalEntry {
    /// Log Sequence Number - monotonically increasing
    pub lsn: u64,

    /// The operation to perform
    pub operation: Operation,

    /// Timestamp (unix millis) when entry was created
    pub timestamp: u64,
}

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operation {
    /// Store a container as-is (create or full replace)
    Put {
        namespace: String,
        container: Container,
    },

    /// Remove a container
    Delete { namespace: String, name: String },
}

impl WalEntry {
    /// Create an entry stamped with the current time
    pub fn new(lsn: u64, operation: Operation) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self {
            lsn,
            operation,
            timestamp,
        }
    }

    /// Encode as `LSN (8) | CRC (4) | Len (4) | Data`
    pub fn serialize(&self) -> Result<Vec<u8>> {
        let data = bincode::serialize(self)?;
        if data.len() > MAX_ENTRY_SIZE {
            return Err(Error::WalWrite(format!(
                "entry too large: {} bytes (max {})",
                data.len(),
                MAX_ENTRY_SIZE
            )));
        }

        let mut bytes = Vec::with_capacity(HEADER_SIZE + data.len());
        bytes.extend_from_slice(&self.lsn.to_be_bytes());
        bytes.extend_from_slice(&Self::compute_crc(&data).to_be_bytes());
        bytes.extend_from_slice(&(data.len() as u32).to_be_bytes());
        bytes.extend_from_slice(&data);
        Ok(bytes)
    }

    /// Decode one entry from the front of `bytes`
    ///
    /// Returns the entry and the number of bytes consumed.
    pub fn deserialize(bytes: &[u8]) -> Result<(Self, usize)> {
        let header = EntryHeader::parse(bytes)?;
        let total = HEADER_SIZE + header.len;
        if bytes.len() < total {
            return Err(Error::WalCorruption(format!(
                "incomplete entry: expected {} bytes, got {}",
                total,
                bytes.len()
            )));
        }
        let entry = Self::decode_body(&header, &bytes[HEADER_SIZE..total])?;
        Ok((entry, total))
    }

    /// Validate the body against its header and decode it
    pub(super) fn decode_body(header: &EntryHeader, data: &[u8]) -> Result<Self> {
        let actual = Self::compute_crc(data);
        if actual != header.crc {
            return Err(Error::WalCorruption(format!(
                "CRC mismatch at LSN {}: expected {:08x}, got {:08x}",
                header.lsn, header.crc, actual
            )));
        }

        let entry: WalEntry = bincode::deserialize(data)
            .map_err(|e| Error::WalCorruption(format!("undecodable entry: {}", e)))?;
        if entry.lsn != header.lsn {
            return Err(Error::WalCorruption(format!(
                "LSN mismatch: header {}, body {}",
                header.lsn, entry.lsn
            )));
        }
        Ok(entry)
    }

    /// CRC32 of an entry body
    pub fn compute_crc(data: &[u8]) -> u32 {
        crc32fast::hash(data)
    }
}

/// Parsed fixed-size entry header
#[derive(Debug, Clone, Copy)]
pub(super) struct EntryHeader {
    pub lsn: u64,
    pub crc: u32,
    pub len: usize,
}

impl EntryHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(Error::WalCorruption(format!(
                "incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut lsn = [0u8; 8];
        lsn.copy_from_slice(&bytes[0..8]);
        let crc = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        let len = u32::from_be_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]) as usize;

        if len > MAX_ENTRY_SIZE {
            return Err(Error::WalCorruption(format!(
                "entry length {} exceeds maximum {}",
                len, MAX_ENTRY_SIZE
            )));
        }

        Ok(Self {
            lsn: u64::from_be_bytes(lsn),
            crc,
            len,
        })
    }
}
