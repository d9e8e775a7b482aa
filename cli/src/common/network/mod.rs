//! # xtetools Network Utilities Module (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Network clients used by the tools. Currently this is the FTP client that
//! `get-xte-obs` uses to reach the HEASARC archive.
//!
//! ## Architecture
//!
//! - **`ftp`**: async control/data connection handling for a single passive-mode
//!   binary download, with per-step timeouts and typed errors.
//!

pub mod ftp;
