//! WAL Reader
//!
//! Handles reading entries from the WAL file.

use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;

use super::entry::{EntryHeader, HEADER_SIZE};
use super::WalEntry;
use crate::error::{Error, Result};

/// What a single read attempt found
#[derive(Debug)]
pub(super) enum Frame {
    /// A valid entry
    Entry(WalEntry),

    /// A complete frame whose body failed validation
    Corrupt { lsn: u64, reason: String },

    /// Partial header or body at the end of the file
    Torn,

    /// Clean end of file
    End,
}

/// Reads entries from the WAL file
pub struct WalReader {
    reader: BufReader<File>,

    /// Offset just past the last complete frame
    position: u64,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            position: 0,
        })
    }

    /// Read the next entry from the WAL
    ///
    /// `Ok(None)` at a clean end of file; torn or corrupt frames are errors.
    pub fn next_entry(&mut self) -> Result<Option<WalEntry>> {
        match self.read_frame()? {
            Frame::Entry(entry) => Ok(Some(entry)),
            Frame::End => Ok(None),
            Frame::Torn => Err(Error::WalCorruption(format!(
                "truncated entry at offset {}",
                self.position
            ))),
            Frame::Corrupt { reason, .. } => Err(Error::WalCorruption(reason)),
        }
    }

    /// Iterate over all valid entries
    pub fn entries(self) -> WalIterator {
        WalIterator {
            reader: self,
            done: false,
        }
    }

    /// Offset just past the last complete frame read
    pub fn position(&self) -> u64 {
        self.position
    }

    pub(super) fn read_frame(&mut self) -> Result<Frame> {
        let mut header = [0u8; HEADER_SIZE];
        match self.read_full(&mut header)? {
            0 => return Ok(Frame::End),
            n if n < HEADER_SIZE => return Ok(Frame::Torn),
            _ => {}
        }

        let header = match EntryHeader::parse(&header) {
            Ok(header) => header,
            // an absurd length cannot be skipped over safely
            Err(_) => return Ok(Frame::Torn),
        };

        let mut data = vec![0u8; header.len];
        if self.read_full(&mut data)? < header.len {
            return Ok(Frame::Torn);
        }
        self.position += (HEADER_SIZE + header.len) as u64;

        match WalEntry::decode_body(&header, &data) {
            Ok(entry) => Ok(Frame::Entry(entry)),
            Err(e) => Ok(Frame::Corrupt {
                lsn: header.lsn,
                reason: e.to_string(),
            }),
        }
    }

    /// Fill `buf` as far as the file allows, returning the bytes read
    fn read_full(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }
}

/// Iterator over WAL entries
///
/// Yields an error once on the first torn or corrupt frame, then stops.
pub struct WalIterator {
    reader: WalReader,
    done: bool,
}

impl Iterator for WalIterator {
    type Item = Result<WalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.reader.next_entry() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
