//! # xtetools Archive Utilities Module (`common::archive`)
//!
//! File: cli/src/common/archive/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Archive-format helpers. The only format handled is the gzip container used
//! by `gziptools`; the `compression` submodule operates on in-memory buffers
//! and leaves file handling to the caller.
//!
//! ```rust
//! use xtetools::common::archive::compression::{compress_gzip, GzipOptions};
//!
//! let gz = compress_gzip(b"hello", &GzipOptions::default()).unwrap();
//! assert_eq!(&gz[..2], &[0x1f, 0x8b]);
//! ```
//!

pub mod compression;
