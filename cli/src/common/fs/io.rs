//! # xtetools Filesystem I/O Operations
//!
//! File: cli/src/common/fs/io.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module centralizes the filesystem operations both tools rely on. The
//! helpers wrap `std::fs` with error context and translate the failure modes
//! that matter to callers into `XteError` variants.
//!
//! ## Architecture
//!
//! - **`ensure_dir_exists`**: creates a directory (and parents) if missing; fails if the path is a file.
//! - **`read_file_bytes`**: reads a whole file into memory.
//! - **`ensure_absent`**: fails with `XteError::OutputExists` if something is already at the path.
//! - **`write_new_file`**: writes bytes to a file that must not exist yet. Creation is exclusive
//!   (`create_new`), so a file appearing between the check and the write is still never overwritten.
//! - **`verify_exists`**: post-write check, fails with `XteError::Integrity`.
//! - **`remove_file_quietly`**: best-effort cleanup used on error paths.
//!
//! ## Usage
//!
//! ```rust
//! use xtetools::common::fs::io;
//! # use tempfile::tempdir;
//!
//! # fn run_example() -> anyhow::Result<()> {
//! # let dir = tempdir()?;
//! let target = dir.path().join("out.bin");
//! io::ensure_absent(&target)?;
//! io::write_new_file(&target, b"payload")?;
//! io::verify_exists(&target)?;
//! assert_eq!(io::read_file_bytes(&target)?, b"payload");
//! # Ok(())
//! # }
//! # run_example().unwrap();
//! ```
//!
use crate::core::error::{Result, XteError};
use anyhow::Context;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{debug, info, warn};

/// Ensures that a directory exists at the specified path.
///
/// If the path does not exist, it is created with any missing parents
/// (like `mkdir -p`). If the path exists but is not a directory,
/// `XteError::LocalWrite` is returned.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|source| XteError::LocalWrite {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Created directory: {:?}", path);
    } else if !path.is_dir() {
        anyhow::bail!(XteError::LocalWrite {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                ErrorKind::Other,
                "Path exists but is not a directory"
            ),
        });
    } else {
        debug!("Directory already exists: {:?}", path);
    }
    Ok(())
}

/// Reads the entire content of a file into memory.
pub fn read_file_bytes(path: &Path) -> Result<Vec<u8>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read file {:?}", path))?;
    debug!("Read {} bytes from {:?}", bytes.len(), path);
    Ok(bytes)
}

/// Fails with `XteError::OutputExists` if anything (file, directory or
/// dangling symlink) is already present at `path`.
pub fn ensure_absent(path: &Path) -> Result<()> {
    // symlink_metadata so a dangling link still counts as "present".
    if fs::symlink_metadata(path).is_ok() {
        anyhow::bail!(XteError::OutputExists {
            path: path.to_path_buf()
        });
    }
    Ok(())
}

/// Writes `content` to a new file at `path`.
///
/// The file is opened with `create_new`, so an existing file is never
/// truncated. The data is flushed to disk before returning.
///
/// # Errors
///
/// - `XteError::OutputExists` if the file already exists.
/// - `XteError::LocalWrite` for any other creation or write failure. A
///   partially written file is removed in that case.
pub fn write_new_file(path: &Path, content: &[u8]) -> Result<()> {
    let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            anyhow::bail!(XteError::OutputExists {
                path: path.to_path_buf()
            })
        }
        Err(source) => {
            anyhow::bail!(XteError::LocalWrite {
                path: path.to_path_buf(),
                source
            })
        }
    };

    if let Err(source) = file.write_all(content).and_then(|_| file.sync_all()) {
        drop(file);
        remove_file_quietly(path);
        anyhow::bail!(XteError::LocalWrite {
            path: path.to_path_buf(),
            source
        });
    }
    info!("Wrote {} bytes to file: {:?}", content.len(), path);
    Ok(())
}

/// Fails with `XteError::Integrity` if `path` is not a regular file.
pub fn verify_exists(path: &Path) -> Result<()> {
    if !path.is_file() {
        anyhow::bail!(XteError::Integrity {
            path: path.to_path_buf()
        });
    }
    Ok(())
}

/// Removes a file, logging instead of failing. Used when unwinding an error.
pub fn remove_file_quietly(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!("Removed partial file {:?}", path),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!("Could not remove partial file {:?}: {}", path, e),
    }
}
