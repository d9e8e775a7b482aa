//! # xtetools Command Modules
//!
//! File: cli/src/commands/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! One module per command-line tool. Each defines its clap argument struct,
//! the operation it performs (returning a structured outcome) and a handler
//! that prints the outcome for the user.
//!
//! ## Command Groups
//!
//! - `fetch`: `get-xte-obs`, download an RXTE observation over FTP
//! - `gz`: `gziptools`, compress or decompress a single file
//!
//! The two tools share no state; they only use the same `core` and `common`
//! infrastructure.
//!

/// Observation download (`get-xte-obs`).
pub mod fetch;
/// Single-file gzip compression and decompression (`gziptools`).
pub mod gz;
