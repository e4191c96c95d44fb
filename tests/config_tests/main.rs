//! Tests for configuration
//!
//! These tests verify:
//! - Server config builder
//! - Client config from TOML files and in-cluster variables
