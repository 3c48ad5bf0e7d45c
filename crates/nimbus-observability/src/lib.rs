// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # nimbus-observability
//!
//! Logging setup shared by the node binary and host tools, with per-crate
//! debug flag support.
//!
//! ## Features
//! - `file-logging`: per-run JSON log files (host only)

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Workspace crate names accepted by `--debug-<crate>`
pub const KNOWN_CRATES: &[&str] = &[
    "nimbus-config",
    "nimbus-hal",
    "nimbus-neural",
    "nimbus-node",
];
