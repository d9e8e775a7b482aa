//! # RXTE Observation Identifiers (`commands::fetch::obsid`)
//!
//! File: cli/src/commands/fetch/obsid.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! An RXTE ObsID such as `50802-01-56-98` names one archived observation. The
//! first five characters are the proposal number (`50802`); its first two
//! digits give the AO (Announcement of Opportunity) cycle the proposal
//! belongs to. On the HEASARC server the tarball lives at
//!
//! ```text
//! <archive root>/AO<n>/P<proposal>/<obsid>.tar.gz
//! ```
//!
//! ## AO mapping
//!
//! - proposal numbers starting `00`..`89`: `AO` + first digit (`50802` -> `AO5`)
//! - proposal numbers starting `90`..`99`: `AO` + (second digit + 9) (`91081` -> `AO10`)
//!
//! The two branches are kept exactly as the archive lays out its directories.
//!
use crate::core::error::{Result, XteError};
use anyhow::anyhow;
use std::fmt;

/// Length of the proposal-number prefix.
pub const PREFIX_LEN: usize = 5;

/// Suffix of the archived observation tarball.
pub const ARCHIVE_SUFFIX: &str = ".tar.gz";

/// A validated ObsID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObsId(String);

impl ObsId {
    /// Validates `raw` as an ObsID.
    ///
    /// The first five characters must be ASCII, the first two decimal digits.
    /// Path separators and control characters are rejected since the ID is
    /// used both as a local file name and inside FTP commands.
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| {
            anyhow!(XteError::InvalidObsId {
                obsid: raw.to_string(),
                reason: reason.to_string(),
            })
        };

        if raw.len() < PREFIX_LEN || !raw.is_char_boundary(PREFIX_LEN) {
            return Err(invalid("expected at least 5 leading characters (e.g. 50802-01-56-98)"));
        }
        if !raw.as_bytes()[..PREFIX_LEN].is_ascii() {
            return Err(invalid("proposal prefix must be ASCII"));
        }
        if !raw.as_bytes()[..2].iter().all(u8::is_ascii_digit) {
            return Err(invalid("the first two characters must be digits"));
        }
        if raw.contains(['/', '\\']) || raw.chars().any(char::is_control) {
            return Err(invalid("must not contain path separators or control characters"));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The proposal number, i.e. the first five characters.
    pub fn prefix(&self) -> &str {
        &self.0[..PREFIX_LEN]
    }

    /// The AO directory name for this observation.
    pub fn bucket(&self) -> String {
        let digits = self.0.as_bytes();
        ao_bucket(digits[0] - b'0', digits[1] - b'0')
    }

    /// Remote directory holding the tarball, below `archive_root`.
    pub fn remote_dir(&self, archive_root: &str) -> String {
        format!(
            "{}/{}/P{}",
            archive_root.trim_end_matches('/'),
            self.bucket(),
            self.prefix()
        )
    }

    /// File name of the tarball, both on the server and locally.
    pub fn archive_name(&self) -> String {
        format!("{}{}", self.0, ARCHIVE_SUFFIX)
    }
}

impl fmt::Display for ObsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// AO directory for a proposal whose number starts with the digits `first`, `second`.
pub fn ao_bucket(first: u8, second: u8) -> String {
    let leading = u32::from(first) * 10 + u32::from(second);
    if leading < 90 {
        format!("AO{}", first)
    } else {
        format!("AO{}", u32::from(second) + 9)
    }
}
