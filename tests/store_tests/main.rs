//! Tests for the container stores
//!
//! These tests verify:
//! - Registry create/update/delete semantics and namespace isolation
//! - MemoryStore through the `ContainerStore` contract

mod memory_tests;

use kvsecrets::ContainerData;

// =============================================================================
// Helper Functions
// =============================================================================

pub fn data(pairs: &[(&str, &str)]) -> ContainerData {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.as_bytes().to_vec()))
        .collect()
}
