//! # gziptools Entry Point
//!
//! File: cli/src/bin/gziptools.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Compresses (`-c`) or decompresses (`-d`) one file in gzip format without
//! ever overwriting an existing file. Choosing both flags or neither is a
//! usage error (exit code 2).
//!
use clap::Parser;
use xtetools::commands::gz::{self, GzArgs};
use xtetools::core::{error, logging};

fn main() {
    let args = GzArgs::parse();
    logging::init(args.verbose);
    tracing::debug!("Parsed CLI arguments: {:?}", args);

    if let Err(e) = gz::handle_gz(args) {
        error::report_and_exit(e);
    }
}
