//! # xtetools Error Types
//!
//! File: cli/src/core/error.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module defines the error types shared by both tools. Every failure that
//! a caller may want to react to has its own `XteError` variant; everything is
//! carried inside an `anyhow::Error` so context can be layered on top.
//!
//! ## Architecture
//!
//! - `XteError`: a `thiserror` enum, one variant per failure class
//! - `Result<T>`: a type alias for `anyhow::Result<T>`
//!
//! The variants group into:
//! - Usage errors (`Usage`, `InvalidObsId`, `Config`)
//! - Remote errors (`Authentication`, `RemoteNotFound`, `Network`, `Protocol`)
//! - Local I/O errors (`LocalWrite`, `OutputExists`, `Integrity`)
//!
//! ## Examples
//!
//! ```rust
//! use xtetools::core::error::{XteError, Result};
//! use std::path::Path;
//!
//! fn guard(path: &Path) -> Result<()> {
//!     if path.exists() {
//!         anyhow::bail!(XteError::OutputExists { path: path.to_path_buf() });
//!     }
//!     Ok(())
//! }
//!
//! let err = guard(Path::new(".")).unwrap_err();
//! assert!(matches!(
//!     err.downcast_ref::<XteError>(),
//!     Some(XteError::OutputExists { .. })
//! ));
//! ```
//!
use std::path::PathBuf;
use thiserror::Error;

/// Custom error type for xtetools.
#[derive(Error, Debug)]
pub enum XteError {
    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid ObsID '{obsid}': {reason}")]
    InvalidObsId { obsid: String, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication as '{user}' failed: {reply}")]
    Authentication { user: String, reply: String },

    #[error("Remote path '{path}' not found: {reply}")]
    RemoteNotFound { path: String, reply: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected server reply: {0}")]
    Protocol(String),

    #[error("Failed to write local file '{}'", path.display())]
    LocalWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Output file '{}' already exists", path.display())]
    OutputExists { path: PathBuf },

    #[error("Output file '{}' is missing after writing", path.display())]
    Integrity { path: PathBuf },
}

impl XteError {
    /// Process exit code used by the binaries for this error.
    ///
    /// Usage problems exit with `2` (the same code clap uses for bad
    /// arguments), everything else with `1`.
    pub fn exit_code(&self) -> i32 {
        match self {
            XteError::Usage(_) | XteError::InvalidObsId { .. } => 2,
            _ => 1,
        }
    }
}

/// Type alias for Result using anyhow::Error.
pub type Result<T> = anyhow::Result<T>;

/// Looks up the `XteError` inside an `anyhow::Error`, if any.
pub fn classify(err: &anyhow::Error) -> Option<&XteError> {
    err.downcast_ref::<XteError>()
}

/// Prints `err` (with its context chain) to stderr and exits the process.
///
/// Shared by both binaries so they report failures the same way.
pub fn report_and_exit(err: anyhow::Error) -> ! {
    tracing::error!("Command execution failed: {:?}", err);
    eprintln!("Error: {:#}", err);
    let code = classify(&err).map_or(1, XteError::exit_code);
    std::process::exit(code);
}
