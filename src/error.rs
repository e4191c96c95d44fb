//! Error types for kvsecrets
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for kvsecrets operations
#[derive(Debug, Error)]
pub enum Error {
    // -------------------------------------------------------------------------
    // Addressing Errors
    // -------------------------------------------------------------------------
    #[error("invalid secret name: `{0}'")]
    InvalidName(String),

    #[error("no secret found for `{0}'")]
    NotFound(String),

    #[error("invalid value encoding: {0}")]
    Decode(String),

    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("container `{0}' already exists")]
    AlreadyExists(String),

    #[error("container `{0}' does not exist")]
    ContainerMissing(String),

    #[error("backend error: {0}")]
    Backend(String),

    #[error("capacity exceeded: {0}")]
    CapacityExceeded(String),

    // -------------------------------------------------------------------------
    // WAL Errors
    // -------------------------------------------------------------------------
    #[error("WAL corruption detected: {0}")]
    WalCorruption(String),

    #[error("WAL write failed: {0}")]
    WalWrite(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Network Errors
    // -------------------------------------------------------------------------
    #[error("Network error: {0}")]
    Network(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    // -------------------------------------------------------------------------
    // Configuration / Output Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Output error: {0}")]
    Output(String),
}

impl Error {
    /// True for failures raised by the container store or the path to it.
    pub fn is_backend(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::AlreadyExists(_)
                | Error::ContainerMissing(_)
                | Error::Backend(_)
                | Error::CapacityExceeded(_)
                | Error::WalCorruption(_)
                | Error::WalWrite(_)
                | Error::Serialization(_)
                | Error::Network(_)
                | Error::Protocol(_)
        )
    }
}

impl From<bincode::Error> for Error {
    fn from(e: bincode::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Decode(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Output(e.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Output(e.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::Config(e.to_string())
    }
}
