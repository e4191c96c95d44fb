//! Configuration for kvsecrets
//!
//! Centralized configuration with sensible defaults. [`Config`] drives the
//! container store server; [`ClientConfig`] and [`ClientSettings`] drive the
//! command line client.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::output::OutputFormat;

/// Default address shared by server and client
pub const DEFAULT_ADDR: &str = "127.0.0.1:7420";

/// Environment variables consulted for in-cluster connections
pub const SERVICE_HOST_ENV: &str = "KVSECRETS_SERVICE_HOST";
pub const SERVICE_PORT_ENV: &str = "KVSECRETS_SERVICE_PORT";

/// Main configuration for a container store server
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all data files
    /// Internal structure:
    ///   {data_dir}/
    ///     └── wal.log          (write-ahead log)
    pub data_dir: PathBuf,

    // -------------------------------------------------------------------------
    // WAL Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: how often to fsync WAL
    pub wal_sync_strategy: WalSyncStrategy,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Number of worker threads serving connections
    pub workers: usize,

    /// Max concurrent client connections
    pub max_connections: usize,

    /// Connection read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

/// WAL sync strategy
#[derive(Debug, Clone, Copy)]
pub enum WalSyncStrategy {
    /// fsync after every write (safest, slowest)
    EveryWrite,

    /// fsync after N uncommitted entries (balanced durability/performance)
    EveryNEntries { count: usize },
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./kvsecrets_data"),
            wal_sync_strategy: WalSyncStrategy::EveryWrite,
            listen_addr: DEFAULT_ADDR.to_string(),
            workers: 8,
            max_connections: 1024,
            read_timeout_ms: 30_000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all storage)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Set the WAL sync strategy
    pub fn wal_sync_strategy(mut self, strategy: WalSyncStrategy) -> Self {
        self.config.wal_sync_strategy = strategy;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the number of connection worker threads (at least one)
    pub fn workers(mut self, count: usize) -> Self {
        self.config.workers = count.max(1);
        self
    }

    /// Set the maximum number of concurrent connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

// =============================================================================
// Client Configuration
// =============================================================================

/// How the client finds its server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionSource {
    /// Read a TOML config file
    ConfigFile(PathBuf),

    /// Use the service environment variables set inside the cluster
    InCluster,
}

/// Connection parameters for a [`RemoteStore`](crate::store::RemoteStore)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Server address (host:port)
    pub server: String,

    /// Connect timeout (milliseconds)
    pub connect_timeout_ms: u64,

    /// Per-request read timeout (milliseconds)
    pub read_timeout_ms: u64,

    /// Per-request write timeout (milliseconds)
    pub write_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_ADDR.to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 10_000,
            write_timeout_ms: 10_000,
        }
    }
}

impl ClientConfig {
    /// Resolve the client config for a connection source
    pub fn load(source: &ConnectionSource) -> Result<Self> {
        match source {
            ConnectionSource::ConfigFile(path) => Self::from_file(path),
            ConnectionSource::InCluster => Self::in_cluster(|name| std::env::var(name).ok()),
        }
    }

    /// Load from a TOML file. A missing file yields the defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&content)
    }

    /// Parse from a TOML string
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)?;
        if config.server.trim().is_empty() {
            return Err(Error::Config("server address must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Build from the in-cluster service variables, looked up through `lookup`
    pub fn in_cluster<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup(SERVICE_HOST_ENV).filter(|h| !h.is_empty());
        let port = lookup(SERVICE_PORT_ENV).filter(|p| !p.is_empty());
        match (host, port) {
            (Some(host), Some(port)) => {
                port.parse::<u16>().map_err(|_| {
                    Error::Config(format!("invalid {}: `{}'", SERVICE_PORT_ENV, port))
                })?;
                let server = if host.contains(':') {
                    format!("[{}]:{}", host, port)
                } else {
                    format!("{}:{}", host, port)
                };
                Ok(Self {
                    server,
                    ..Self::default()
                })
            }
            _ => Err(Error::Config(format!(
                "unable to load in-cluster configuration, {} and {} must be defined",
                SERVICE_HOST_ENV, SERVICE_PORT_ENV
            ))),
        }
    }

    /// Default config file location: `~/.kvsecrets/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".kvsecrets").join("config.toml"))
    }
}

/// Everything a client invocation needs, built once and passed explicitly
#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Namespace every operation is scoped to
    pub namespace: String,

    /// Output format for projections
    pub output: OutputFormat,

    /// Connection parameters
    pub client: ClientConfig,
}

impl ClientSettings {
    pub fn new(namespace: impl Into<String>, output: OutputFormat, client: ClientConfig) -> Self {
        Self {
            namespace: namespace.into(),
            output,
            client,
        }
    }
}
