//! Common test utilities and helpers
//!
//! This module provides shared functionality used across integration tests:
//! - Binary path resolution (via `get_caer_build_binary`)
//! - Package checkout fixtures (via `helpers`)

pub(crate) mod helpers;

// Re-export get_caer_build_binary for convenient access
#[allow(unused_imports)]
pub(crate) use helpers::get_caer_build_binary;
