//! # xtetools Filesystem Utilities (`common::fs`)
//!
//! File: cli/src/common/fs/mod.rs
//! Author: Christi Mahu
//!
//! Filesystem helpers shared by both tools. Everything currently lives in
//! `io`: whole-file reads, exclusive writes and the existence checks that
//! keep `gziptools` from ever overwriting a file.
//!

/// Reading, exclusive writing and existence checks.
pub mod io;
