//! Common test utilities and shared infrastructure.
//!
//! This module provides all the shared functionality used across the test suite:
//! - `fixtures`: temporary workspaces, catalog builders, and a recording runner
//! - `assertions`: High-level assertion helpers for result files and errors

pub mod assertions;
pub mod fixtures;

// Re-export commonly used test helpers
#[allow(unused_imports)] // These are used across many test files
pub use fixtures::{catalog_of, local_target, shell_step, RecordingRunner, TestWorkspace};
