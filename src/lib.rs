//! # kvsecrets
//!
//! Per-key get/set/delete over a store that only reads and writes whole
//! containers:
//! - Compound `container.key` addressing with case-insensitive lookup
//! - Merge-on-write and key-level delete by read-modify-write
//! - Display-safe projection of binary values
//! - A WAL-backed container store server with a TCP protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    kvsecrets CLI                             │
//! │             (get / set / delete, json|yaml)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                 secrets::{list, set, delete}                 │
//! │        (address parsing, merge, projection)                  │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ ContainerStore
//!          ┌────────────┴────────────┐
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐     TCP     ┌─────────────┐
//!   │ MemoryStore │          │ RemoteStore │ ──────────▶ │   Engine    │
//!   └─────────────┘          └─────────────┘             │ (WAL + map) │
//!                                                        └─────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod container;
pub mod engine;
pub mod network;
pub mod output;
pub mod protocol;
pub mod secrets;
pub mod store;
pub mod wal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::{ClientConfig, ClientSettings, Config, ConnectionSource};
pub use container::{Container, ContainerData};
pub use engine::Engine;
pub use error::{Error, Result};
pub use output::OutputFormat;
pub use secrets::{Address, Projection};
pub use store::{ContainerStore, MemoryStore, RemoteStore};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of kvsecrets
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
