//! # xtetools Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module is the root for shared utility modules. It keeps protocol and
//! file-format plumbing apart from the command logic in `commands::` and the
//! infrastructure in `core::`.
//!
//! ## Architecture
//!
//! - **`archive`**: in-memory gzip encode/decode (`compression`).
//! - **`fs`**: whole-file reads, exclusive writes and existence checks (`io`).
//! - **`network`**: the FTP client (`ftp`).
//!
//! ## Usage
//!
//! ```rust
//! use xtetools::common::{archive, fs};
//! # use tempfile::tempdir;
//!
//! # fn run_example() -> anyhow::Result<()> {
//! # let dir = tempdir()?;
//! let gz = archive::compression::compress_gzip(b"data", &Default::default())?;
//! fs::io::write_new_file(&dir.path().join("data.gz"), &gz)?;
//! # Ok(())
//! # }
//! # run_example().unwrap();
//! ```
//!

/// In-memory gzip compression and decompression.
pub mod archive;
/// Filesystem operations (reads, exclusive writes, existence checks).
pub mod fs;
/// Network clients (FTP).
pub mod network;
