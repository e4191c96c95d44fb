//! Engine Module
//!
//! The server-side container store that coordinates the registry and WAL.
//!
//! ## Responsibilities
//! - Serve list/create/update/delete of whole containers per namespace
//! - Log every mutation to the WAL before applying it
//! - Manage crash recovery and WAL compaction on startup

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::{Mutex, RwLock};

use crate::config::{Config, WalSyncStrategy};
use crate::container::Container;
use crate::error::{Error, Result};
use crate::protocol::{Command, MAX_PAYLOAD_SIZE};
use crate::store::{ContainerStore, Registry};
use crate::wal::{Operation, RecoveryResult, WalRecovery, WalWriter};

/// The container store engine
///
/// ## Concurrency Model: Single-Writer / Multiple-Reader (SWMR)
///
/// - **Writes** (create/update/delete): Serialized by the `wal` mutex
///   - Only ONE write operation at a time
///   - Must acquire: wal → registry (write)
///   - The registry check happens under the same locks as the write, so
///     create/update/delete are atomic per container
///
/// - **Reads** (list): Concurrent, registry read lock only
pub struct Engine {
    /// Engine configuration
    config: Config,

    /// Path of the write-ahead log
    wal_path: PathBuf,

    /// Write-ahead log for durability (exclusive access needed)
    wal: Mutex<WalWriter>,

    /// Current containers by namespace
    registry: RwLock<Registry>,
}

impl Engine {
    // =========================================================================
    // Internal Path Constants
    // =========================================================================
    const WAL_FILENAME: &'static str = "wal.log";
    const COMPACT_SUFFIX: &'static str = "compact";

    /// Open or create an engine with the given config
    ///
    /// On startup:
    /// 1. Open/create data directory
    /// 2. Recover from WAL if it exists and replay into the registry
    /// 3. Rewrite the WAL as one entry per live container
    /// 4. Ready to serve requests
    pub fn open(config: Config) -> Result<Self> {
        fs::create_dir_all(&config.data_dir)?;
        let wal_path = config.data_dir.join(Self::WAL_FILENAME);

        let mut registry = Registry::new();
        if wal_path.exists() {
            let (entries, result) = WalRecovery::recover(&wal_path)?;
            Self::log_recovery(&result);

            for entry in entries {
                match entry.operation {
                    Operation::Put {
                        namespace,
                        container,
                    } => registry.restore(&namespace, container),
                    Operation::Delete { namespace, name } => registry.forget(&namespace, &name),
                }
            }

            if result.entries_recovered > 0 || result.entries_corrupted > 0 {
                Self::compact(&wal_path, &registry)?;
                tracing::info!("WAL compacted to {} containers", registry.len());
            }
        }

        let wal = WalWriter::open(&wal_path, config.wal_sync_strategy)?;

        Ok(Self {
            config,
            wal_path,
            wal: Mutex::new(wal),
            registry: RwLock::new(registry),
        })
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified data directory
    pub fn open_path(path: &Path) -> Result<Self> {
        let config = Config::builder()
            .data_dir(path)
            .wal_sync_strategy(WalSyncStrategy::EveryWrite)
            .build();
        Self::open(config)
    }

    /// Execute a command
    ///
    /// Routes commands to appropriate handlers; the payload is what goes
    /// back to the client in an OK response.
    pub fn execute(&self, command: Command) -> Result<Option<Vec<u8>>> {
        match command {
            Command::List { namespace } => {
                let containers = self.list(&namespace)?;
                Ok(Some(bincode::serialize(&containers)?))
            }
            Command::Create {
                namespace,
                container,
            } => {
                let created = self.create(&namespace, container)?;
                Ok(Some(bincode::serialize(&created)?))
            }
            Command::Update {
                namespace,
                container,
            } => {
                let updated = self.update(&namespace, container)?;
                Ok(Some(bincode::serialize(&updated)?))
            }
            Command::Delete { namespace, name } => {
                self.delete(&namespace, &name)?;
                Ok(None)
            }
            Command::Ping => Ok(Some(b"PONG".to_vec())),
        }
    }

    /// Close the engine gracefully
    ///
    /// Syncs the WAL to disk
    pub fn close(self) -> Result<()> {
        let mut wal = self.wal.into_inner();
        wal.sync()
    }

    // =========================================================================
    // Recovery
    // =========================================================================

    fn log_recovery(result: &RecoveryResult) {
        if result.entries_recovered > 0 || result.entries_corrupted > 0 {
            tracing::info!(
                "WAL recovery: {} entries recovered, {} corrupted, last_lsn={}",
                result.entries_recovered,
                result.entries_corrupted,
                result.last_lsn
            );
        }
        if result.was_truncated {
            tracing::warn!("WAL recovery removed a partial write at the tail");
        }
    }

    /// Replace the WAL with one Put per live container
    ///
    /// Written to a sibling file, then renamed over the live log.
    fn compact(wal_path: &Path, registry: &Registry) -> Result<()> {
        let tmp_path = wal_path.with_extension(Self::COMPACT_SUFFIX);
        if tmp_path.exists() {
            fs::remove_file(&tmp_path)?;
        }

        {
            let mut writer = WalWriter::open(
                &tmp_path,
                WalSyncStrategy::EveryNEntries { count: usize::MAX },
            )?;
            for (namespace, container) in registry.iter() {
                writer.append(Operation::Put {
                    namespace: namespace.to_string(),
                    container: container.clone(),
                })?;
            }
            writer.sync()?;
        }

        fs::rename(&tmp_path, wal_path)?;
        Ok(())
    }

    // =========================================================================
    // Limits
    // =========================================================================

    /// Refuse a write after which the namespace's LIST reply would not fit
    /// in one protocol frame
    fn check_list_size(registry: &Registry, namespace: &str, candidate: &Container) -> Result<()> {
        // bincode length prefix of the container sequence
        let mut size = 8u64;
        for existing in registry.containers(namespace) {
            if existing.name != candidate.name {
                size += bincode::serialized_size(existing)?;
            }
        }
        size += bincode::serialized_size(candidate)?;

        if size > u64::from(MAX_PAYLOAD_SIZE) {
            return Err(Error::CapacityExceeded(format!(
                "namespace `{}' would grow to {} bytes (max {}) with container `{}'",
                namespace, size, MAX_PAYLOAD_SIZE, candidate.name
            )));
        }
        Ok(())
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    /// Get the WAL path
    pub fn wal_path(&self) -> &Path {
        &self.wal_path
    }

    /// Total number of containers across namespaces
    pub fn container_count(&self) -> usize {
        self.registry.read().len()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl ContainerStore for Engine {
    fn list(&self, namespace: &str) -> Result<Vec<Container>> {
        Ok(self.registry.read().list(namespace))
    }

    fn create(&self, namespace: &str, container: Container) -> Result<Container> {
        let mut wal = self.wal.lock();
        let mut registry = self.registry.write();

        let created = registry.prepare_create(namespace, container, Utc::now())?;
        Self::check_list_size(&registry, namespace, &created)?;
        wal.append(Operation::Put {
            namespace: namespace.to_string(),
            container: created.clone(),
        })?;
        registry.restore(namespace, created.clone());

        tracing::debug!(namespace, container = %created.name, "created container");
        Ok(created)
    }

    fn update(&self, namespace: &str, container: Container) -> Result<Container> {
        let mut wal = self.wal.lock();
        let mut registry = self.registry.write();

        let updated = registry.prepare_update(namespace, container)?;
        Self::check_list_size(&registry, namespace, &updated)?;
        wal.append(Operation::Put {
            namespace: namespace.to_string(),
            container: updated.clone(),
        })?;
        registry.restore(namespace, updated.clone());

        tracing::debug!(
            namespace,
            container = %updated.name,
            keys = updated.data.len(),
            "updated container"
        );
        Ok(updated)
    }

    fn delete(&self, namespace: &str, name: &str) -> Result<()> {
        let mut wal = self.wal.lock();
        let mut registry = self.registry.write();

        if registry.get(namespace, name).is_none() {
            return Err(Error::ContainerMissing(name.to_string()));
        }
        wal.append(Operation::Delete {
            namespace: namespace.to_string(),
            name: name.to_string(),
        })?;
        registry.forget(namespace, name);

        tracing::debug!(namespace, container = name, "deleted container");
        Ok(())
    }
}
