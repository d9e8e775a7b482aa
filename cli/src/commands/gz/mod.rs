//! # xtetools Gzip File Tool
//!
//! File: cli/src/commands/gz/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module implements `gziptools`: compress `FILE` into `FILE.gz` (`-c`)
//! or decompress `FILE.gz` into `FILE` (`-d`). The whole file is transformed
//! in memory.
//!
//! An existing output file is never overwritten. The output path is checked
//! before writing, the file is then created exclusively, and its presence is
//! verified afterwards.
//!
//! ## Examples
//!
//! ```bash
//! gziptools data.bin -c        # -> data.bin.gz
//! gziptools data.bin.gz -d     # -> data.bin
//! gziptools data.bin -c -l 1   # fastest compression
//! ```
//!
use crate::common::archive::compression::{self, GzipOptions, GZIP_SUFFIX, MAX_LEVEL};
use crate::common::fs::io;
use crate::core::error::{Result, XteError};
use clap::Parser;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, info};

/// # Gzip Command Arguments (`GzArgs`)
///
/// Exactly one of `-c` / `-d` must be given; the check happens in `mode()` so
/// the error message can say which rule was broken.
#[derive(Parser, Debug)]
#[command(
    name = "gziptools",
    about = "A simple tool to handle gzip tasks",
    long_about = "A simple tool to handle gzip tasks.\n\
                  NOTE: use only one of the method flags -c OR -d.",
    version
)]
pub struct GzArgs {
    /// The file to be (de)compressed.
    pub filename: PathBuf,

    /// Decompress FILENAME.gz into FILENAME.
    #[arg(short, long)]
    pub decompress: bool,

    /// Compress FILENAME into FILENAME.gz.
    #[arg(short, long)]
    pub compress: bool,

    /// Compression level, 0 (store) to 9 (best).
    #[arg(
        short,
        long,
        default_value_t = MAX_LEVEL,
        value_parser = clap::value_parser!(u32).range(0..=9)
    )]
    pub level: u32,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Which transform an invocation performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecMode {
    Compress,
    Decompress,
}

impl GzArgs {
    /// Resolves the `-c` / `-d` flags into a mode.
    pub fn mode(&self) -> Result<CodecMode> {
        mode_from_flags(self.compress, self.decompress)
    }
}

/// Exactly one flag must be set; both or neither is `XteError::Usage`.
pub fn mode_from_flags(compress: bool, decompress: bool) -> Result<CodecMode> {
    match (compress, decompress) {
        (true, false) => Ok(CodecMode::Compress),
        (false, true) => Ok(CodecMode::Decompress),
        (true, true) => anyhow::bail!(XteError::Usage(
            "Incompatible methods chosen. Run again with only one flag, -c or -d \
             (see gziptools --help)."
                .to_string()
        )),
        (false, false) => anyhow::bail!(XteError::Usage(
            "No method chosen. Run again with the flag -c or -d (see gziptools --help)."
                .to_string()
        )),
    }
}

/// What a successful transform produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodecOutcome {
    pub mode: CodecMode,
    pub input: PathBuf,
    pub output: PathBuf,
    pub bytes_in: usize,
    pub bytes_out: usize,
}

/// # Handle Gzip Command (`handle_gz`)
///
/// Resolves the mode, runs the transform and prints the result.
pub fn handle_gz(args: GzArgs) -> Result<()> {
    let mode = args.mode()?;
    info!("Handling gziptools {:?} for {:?}", mode, args.filename);

    let outcome = match mode {
        CodecMode::Compress => compress_file(&args.filename, args.level)?,
        CodecMode::Decompress => decompress_file(&args.filename)?,
    };

    let verb = match outcome.mode {
        CodecMode::Compress => "compressed",
        CodecMode::Decompress => "decompressed",
    };
    println!(
        "File successfully {}: {} -> {} ({} -> {} bytes)",
        verb,
        outcome.input.display(),
        outcome.output.display(),
        outcome.bytes_in,
        outcome.bytes_out
    );
    Ok(())
}

/// `FILE` -> `FILE.gz`
pub fn compressed_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(GZIP_SUFFIX);
    PathBuf::from(name)
}

/// `FILE.gz` -> `FILE`. Fails with `XteError::Usage` when the name has no
/// `.gz` suffix (or nothing in front of it).
pub fn decompressed_path(path: &Path) -> Result<PathBuf> {
    let suffix = GZIP_SUFFIX.trim_start_matches('.');
    let stripped = path
        .file_stem()
        .filter(|_| path.extension() == Some(OsStr::new(suffix)))
        .filter(|stem| !stem.is_empty() && *stem != OsStr::new("."));

    match stripped {
        Some(stem) => Ok(path.with_file_name(stem)),
        None => anyhow::bail!(XteError::Usage(format!(
            "'{}' does not end in {}; cannot derive the output file name",
            path.display(),
            GZIP_SUFFIX
        ))),
    }
}

/// # Compress a File (`compress_file`)
///
/// Reads `path` into memory and writes `path.gz`. The gzip header records the
/// base file name and modification time of `path`.
///
/// ## Errors
///
/// - `XteError::OutputExists` if `path.gz` already exists (nothing is written).
/// - `XteError::LocalWrite` / `XteError::Integrity` if writing fails.
/// - An I/O error if `path` cannot be read.
pub fn compress_file(path: &Path, level: u32) -> Result<CodecOutcome> {
    let content = io::read_file_bytes(path)?;
    let output = compressed_path(path);
    io::ensure_absent(&output)?;

    let options = GzipOptions {
        level,
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned()),
        mtime: source_mtime(path),
    };
    let compressed = compression::compress_gzip(&content, &options)?;

    io::write_new_file(&output, &compressed)?;
    io::verify_exists(&output)?;
    debug!("Compressed {:?} into {:?}", path, output);

    Ok(CodecOutcome {
        mode: CodecMode::Compress,
        input: path.to_path_buf(),
        output,
        bytes_in: content.len(),
        bytes_out: compressed.len(),
    })
}

/// # Decompress a File (`decompress_file`)
///
/// Reads and decodes `path` (which must end in `.gz`) and writes the result
/// next to it with the suffix removed.
///
/// ## Errors
///
/// - `XteError::Usage` if `path` has no `.gz` suffix.
/// - `XteError::OutputExists` if the output already exists (nothing is written).
/// - `XteError::LocalWrite` / `XteError::Integrity` if writing fails.
/// - An I/O error if `path` cannot be read or is not valid gzip.
pub fn decompress_file(path: &Path) -> Result<CodecOutcome> {
    let output = decompressed_path(path)?;
    let content = io::read_file_bytes(path)?;
    let decompressed = compression::decompress_gzip(&content)?;

    io::ensure_absent(&output)?;
    io::write_new_file(&output, &decompressed)?;
    io::verify_exists(&output)?;
    debug!("Decompressed {:?} into {:?}", path, output);

    Ok(CodecOutcome {
        mode: CodecMode::Decompress,
        input: path.to_path_buf(),
        output,
        bytes_in: content.len(),
        bytes_out: decompressed.len(),
    })
}

/// Modification time of `path` in whole seconds, or 0 when unavailable.
fn source_mtime(path: &Path) -> u32 {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|modified| modified.duration_since(UNIX_EPOCH).ok())
        .and_then(|age| u32::try_from(age.as_secs()).ok())
        .unwrap_or(0)
}
