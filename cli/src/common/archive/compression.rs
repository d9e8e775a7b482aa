//! # xtetools Compression Utilities (`common::archive::compression`)
//!
//! File: cli/src/common/archive/compression.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! In-memory gzip (RFC 1952) encoding and decoding on byte slices, built on
//! `flate2`. Files are handled whole: the caller reads the input into a
//! buffer, transforms it here, and writes the result.
//!
//! ## Architecture
//!
//! - `compress_gzip(data, options)`: encodes with the requested level and
//!   records the original file name and modification time in the header
//!   (the FNAME and MTIME fields), the same way `gzip(1)` does.
//! - `decompress_gzip(data)`: decodes every member of the stream, so files
//!   produced by concatenating `.gz` files decode to the concatenated input.
//!
//! ## Usage
//!
//! ```rust
//! use xtetools::common::archive::compression::{self, GzipOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = b"Some data to compress";
//! let compressed = compression::compress_gzip(data, &GzipOptions::default())?;
//! let decompressed = compression::decompress_gzip(&compressed)?;
//! assert_eq!(data.to_vec(), decompressed);
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{Result, XteError};
use anyhow::Context;
use flate2::{read::MultiGzDecoder, Compression, GzBuilder};
use std::io::{Read, Write};
use tracing::debug;

/// Suffix appended on compression and stripped on decompression.
pub const GZIP_SUFFIX: &str = ".gz";

/// First two bytes of every gzip member.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Highest level accepted by deflate.
pub const MAX_LEVEL: u32 = 9;

/// Header fields and level for `compress_gzip`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GzipOptions {
    /// Deflate level, 0 (store) to 9 (best).
    pub level: u32,
    /// Original file name stored in the header, without directories.
    pub file_name: Option<String>,
    /// Modification time of the original file, seconds since the epoch (0 = unknown).
    pub mtime: u32,
}

impl Default for GzipOptions {
    fn default() -> Self {
        Self {
            level: MAX_LEVEL,
            file_name: None,
            mtime: 0,
        }
    }
}

/// Compresses `data` into a single gzip member.
///
/// # Errors
///
/// Returns `XteError::Usage` if `options.level` is above 9, or an I/O error
/// from the encoder.
pub fn compress_gzip(data: &[u8], options: &GzipOptions) -> Result<Vec<u8>> {
    if options.level > MAX_LEVEL {
        anyhow::bail!(XteError::Usage(format!(
            "compression level must be between 0 and {}, got {}",
            MAX_LEVEL, options.level
        )));
    }

    let mut builder = GzBuilder::new().mtime(options.mtime);
    if let Some(name) = &options.file_name {
        builder = builder.filename(name.as_bytes());
    }

    let mut encoder = builder.write(Vec::new(), Compression::new(options.level));
    encoder
        .write_all(data)
        .context("Failed to feed data to gzip encoder")?;
    let compressed = encoder
        .finish()
        .context("Failed to finish gzip compression stream")?;

    debug!(
        "Compressed {} bytes to {} bytes (level {})",
        data.len(),
        compressed.len(),
        options.level
    );
    Ok(compressed)
}

/// Decompresses a (possibly multi-member) gzip stream.
///
/// # Errors
///
/// Fails if the input does not start with the gzip magic bytes, or if the
/// stream is truncated or corrupt (bad CRC, bad length).
pub fn decompress_gzip(data: &[u8]) -> Result<Vec<u8>> {
    if !data.starts_with(&GZIP_MAGIC) {
        anyhow::bail!(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "input is not in gzip format"
        ));
    }

    let mut decoder = MultiGzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .context("Failed to decode gzip stream")?;

    debug!(
        "Decompressed {} bytes to {} bytes",
        data.len(),
        decompressed.len()
    );
    Ok(decompressed)
}
