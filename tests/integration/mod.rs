//! Integration tests for coalesce-rs
//!
//! These tests drive the public API the way an embedding service would.

pub mod config_tests;
pub mod executor_mock_tests;
pub mod registry_tests;
