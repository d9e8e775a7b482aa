//! # get-xte-obs Entry Point
//!
//! File: cli/src/bin/get_xte_obs.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Downloads an RXTE observation from the HEASARC archive via FTP.
//!
//! ```bash
//! # Downloading as anonymous (give your e-mail as password)
//! get-xte-obs 50802-01-56-98 -p username@mail.com
//!
//! # Downloading as a named user
//! get-xte-obs 50802-01-56-98 -u username -p secret
//! ```
//!
//! Processing flow:
//! 1. Parse command-line args via Clap
//! 2. Configure logging based on verbosity level
//! 3. Run the fetch handler
//! 4. Print any error and exit non-zero
//!
use clap::Parser;
use xtetools::commands::fetch::{self, FetchArgs};
use xtetools::core::{error, logging};

#[tokio::main]
async fn main() {
    let args = FetchArgs::parse();
    logging::init(args.verbose);
    tracing::debug!("Parsed CLI arguments for ObsID {}", args.obsid);

    if let Err(e) = fetch::handle_fetch(args).await {
        error::report_and_exit(e);
    }
}
