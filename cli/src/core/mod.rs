//! # xtetools Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module aggregates the infrastructure shared by both command-line tools.
//!
//! ## Architecture
//!
//! - `config`: loading, merging and validation of the fetcher configuration
//! - `error`: the `XteError` type and the `Result` alias
//! - `logging`: `tracing` subscriber setup driven by `-v` / `RUST_LOG`
//!
//! ## Usage
//!
//! ```rust
//! use xtetools::core::config; // For loading configuration
//! use xtetools::core::error::{XteError, Result}; // For error handling
//! use xtetools::core::logging; // For logger initialization
//! ```
//!
pub mod config;
pub mod error;
pub mod logging;
