//! # xtetools Logging Setup
//!
//! File: cli/src/core/logging.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Installs the global `tracing` subscriber for both binaries. The level is
//! picked from the number of `-v` flags unless `RUST_LOG` is set, in which case
//! the environment wins. Logs go to stderr so stdout stays reserved for the
//! tools' result messages.
//!
use tracing_subscriber::{fmt, EnvFilter};

/// Maps the `-v` count to a default filter directive.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initializes the compact stderr formatter.
///
/// Uses `try_init` so calling it twice (e.g. from tests) is harmless.
pub fn init(verbose: u8) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_for(verbose)));
    let _ = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init();
}
