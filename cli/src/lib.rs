//! # xtetools
//!
//! File: cli/src/lib.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Library behind two small command-line tools for working with RXTE data:
//!
//! - `get-xte-obs`: downloads an observation tarball (`<OBSID>.tar.gz`) from
//!   the HEASARC FTP archive.
//! - `gziptools`: compresses or decompresses a single file in gzip format,
//!   never overwriting an existing file.
//!
//! ## Architecture
//!
//! - `commands`: the two tools (argument parsing, operations, handlers)
//! - `common`: gzip codec, filesystem helpers, FTP client
//! - `core`: errors, configuration, logging
//!
//! The binaries in `src/bin/` only parse arguments, set up logging and call
//! the handlers here.
//!
//! ## Examples
//!
//! ```rust
//! use xtetools::commands::fetch::ObsId;
//!
//! let obsid = ObsId::parse("91081-02-56-98").unwrap();
//! assert_eq!(obsid.bucket(), "AO10");
//! assert_eq!(
//!     obsid.remote_dir("/xte/data/archive"),
//!     "/xte/data/archive/AO10/P91081"
//! );
//! ```
//!

pub mod commands;
pub mod common;
pub mod core;
