//! Tests for Engine
//!
//! These tests verify:
//! - Container store semantics (create/update/delete/list)
//! - Command execution
//! - The per-namespace size limit on writes
//! - Durability across reopen and crash recovery from the WAL
//! - WAL compaction on startup
//! - Concurrent access
//! - The per-key operations running directly on the engine
