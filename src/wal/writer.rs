//! WAL Writer
//!
//! Handles appending entries to the WAL file.
//!
//! Each frame goes to the file in a single `write_all`. If the write or the
//! following sync fails, the file is cut back to its length before the
//! append, so a failed operation never becomes durable and never leaves a
//! partial frame in front of later ones. If that cut fails as well the
//! writer is poisoned and refuses further appends.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use super::reader::{Frame, WalReader};
use super::{Operation, WalEntry};
use crate::config::WalSyncStrategy;
use crate::error::{Error, Result};

/// Append-only storage under a [`WalWriter`]
pub trait LogFile: Write {
    /// Current length in bytes
    fn file_len(&self) -> io::Result<u64>;

    /// Cut the log back to `len` bytes
    fn set_len(&mut self, len: u64) -> io::Result<()>;

    /// Make written bytes durable
    fn sync_data(&mut self) -> io::Result<()>;
}

impl LogFile for File {
    fn file_len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn set_len(&mut self, len: u64) -> io::Result<()> {
        File::set_len(self, len)
    }

    fn sync_data(&mut self) -> io::Result<()> {
        File::sync_data(self)
    }
}

/// Writes entries to the WAL file
pub struct WalWriter<F: LogFile = File> {
    file: F,

    /// Length of the log up to the last complete frame
    len: u64,
    next_lsn: u64,
    sync_strategy: WalSyncStrategy,

    /// Entries appended since the last fsync
    unsynced: usize,

    /// Set when a failed append could not be rolled back
    poisoned: bool,
}

impl WalWriter<File> {
    /// Open or create a WAL file
    ///
    /// LSNs continue after the last valid entry already in the file.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let last_lsn = if path.exists() {
            Self::last_valid_lsn(path)?
        } else {
            0
        };

        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Self::with_log(file, last_lsn + 1, sync_strategy)
    }

    fn last_valid_lsn(path: &Path) -> Result<u64> {
        let mut reader = WalReader::open(path)?;
        let mut last = 0;
        loop {
            match reader.read_frame()? {
                Frame::Entry(entry) => last = entry.lsn,
                Frame::Corrupt { lsn, .. } => last = last.max(lsn),
                Frame::Torn | Frame::End => return Ok(last),
            }
        }
    }
}

impl<F: LogFile> WalWriter<F> {
    /// Wrap an already positioned log; appends go after its current end
    pub fn with_log(file: F, next_lsn: u64, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let len = file.file_len()?;
        Ok(Self {
            file,
            len,
            next_lsn,
            sync_strategy,
            unsynced: 0,
            poisoned: false,
        })
    }

    /// Append an operation, returning its LSN
    ///
    /// On error the log is left exactly as it was before the call.
    pub fn append(&mut self, operation: Operation) -> Result<u64> {
        if self.poisoned {
            return Err(Error::WalWrite(
                "log is poisoned by an earlier failed append".to_string(),
            ));
        }

        let lsn = self.next_lsn;
        let bytes = WalEntry::new(lsn, operation).serialize()?;

        let should_sync = match self.sync_strategy {
            WalSyncStrategy::EveryWrite => true,
            WalSyncStrategy::EveryNEntries { count } => self.unsynced + 1 >= count.max(1),
        };

        let written = self.file.write_all(&bytes).and_then(|_| {
            self.file.flush()?;
            if should_sync {
                self.file.sync_data()?;
            }
            Ok(())
        });

        if let Err(e) = written {
            self.rollback();
            return Err(Error::WalWrite(format!("append at LSN {} failed: {}", lsn, e)));
        }

        self.len += bytes.len() as u64;
        self.next_lsn += 1;
        self.unsynced = if should_sync { 0 } else { self.unsynced + 1 };
        Ok(lsn)
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        self.unsynced = 0;
        Ok(())
    }

    /// Discard every entry; LSNs keep counting up
    pub fn truncate(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.set_len(0)?;
        self.file.sync_data()?;
        self.len = 0;
        self.unsynced = 0;
        self.poisoned = false;
        Ok(())
    }

    /// Get the LSN the next append will use
    pub fn current_lsn(&self) -> u64 {
        self.next_lsn
    }

    /// Whether appends are refused after a failed rollback
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    fn rollback(&mut self) {
        if let Err(e) = self.file.set_len(self.len) {
            tracing::error!("WAL rollback to {} bytes failed: {}", self.len, e);
            self.poisoned = true;
        }
    }
}
