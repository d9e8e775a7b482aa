//! # xtetools Configuration System
//!
//! File: cli/src/core/config.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module builds the configuration used by `get-xte-obs`. The archive
//! host, credentials and download location are explicit values passed to the
//! fetch operation; nothing is kept in module-level state.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Command-line flags and their `XTE_FTP_*` environment fallbacks
//! 2. A TOML file: `--config <FILE>` or the user file
//!    `<config dir>/xtetools/config.toml`
//! 3. Default values defined in the code (the HEASARC archive, anonymous login)
//!
//! After merging, `download_dir` is tilde-expanded and the result is validated.
//!
//! ## Examples
//!
//! Configuration file format:
//!
//! ```toml
//! [ftp]
//! host = "heasarc.gsfc.nasa.gov"
//! port = 21
//! archive_root = "/xte/data/archive"
//! user = "anonymous"
//! password = "me@example.org"
//! timeout_secs = 60
//! download_dir = "~/data/xte"
//! ```
//!
//! Loading and resolving:
//!
//! ```rust,no_run
//! use xtetools::core::config::{self, FetchOverrides};
//!
//! # fn main() -> anyhow::Result<()> {
//! let file_cfg = config::load_config(None)?;
//! let fetch_cfg = config::resolve(file_cfg, FetchOverrides::default())?;
//! println!("Archive host: {}:{}", fetch_cfg.host, fetch_cfg.port);
//! # Ok(())
//! # }
//! ```
//!
use crate::core::error::{Result, XteError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fmt;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::{debug, info, warn};

/// HEASARC anonymous FTP server hosting the RXTE archive.
pub const DEFAULT_HOST: &str = "heasarc.gsfc.nasa.gov";
pub const DEFAULT_PORT: u16 = 21;
/// Root of the RXTE per-AO directory tree on the archive server.
pub const DEFAULT_ARCHIVE_ROOT: &str = "/xte/data/archive";
pub const DEFAULT_USER: &str = "anonymous";
/// HEASARC asks anonymous users to send their e-mail address as the password.
pub const DEFAULT_PASSWORD: &str = "anonymous@server.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Represents the configuration file, loaded from TOML.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub ftp: FtpSettings,
}

/// The `[ftp]` table. Unset keys fall back to the built-in defaults.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct FtpSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_archive_root")]
    pub archive_root: String,
    #[serde(default = "default_user")]
    pub user: String,
    #[serde(default = "default_password")]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Where downloads are written (can use ~). Defaults to the working directory.
    #[serde(default = "default_download_dir")]
    pub download_dir: String,
}

impl Default for FtpSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            archive_root: default_archive_root(),
            user: default_user(),
            password: default_password(),
            timeout_secs: default_timeout_secs(),
            download_dir: default_download_dir(),
        }
    }
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_archive_root() -> String {
    DEFAULT_ARCHIVE_ROOT.to_string()
}
fn default_user() -> String {
    DEFAULT_USER.to_string()
}
fn default_password() -> String {
    DEFAULT_PASSWORD.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_download_dir() -> String {
    ".".to_string()
}

/// Values given on the command line (or through their environment variables).
/// `None` means "not given", so the file or default value is kept.
#[derive(Debug, Default, Clone)]
pub struct FetchOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub timeout_secs: Option<u64>,
    pub download_dir: Option<PathBuf>,
}

/// FTP login pair. Used once per fetch.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

// Keeps passwords out of debug logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// # Effective Fetch Configuration (`FetchConfig`)
///
/// The final, validated settings handed to `commands::fetch::fetch`.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub host: String,
    pub port: u16,
    /// Absolute remote directory holding the `AO<n>` buckets.
    pub archive_root: String,
    pub credentials: Credentials,
    /// Bound applied to each connect, reply read and data read.
    pub timeout: Duration,
    /// Local directory receiving the downloaded tarball.
    pub download_dir: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            archive_root: DEFAULT_ARCHIVE_ROOT.to_string(),
            credentials: Credentials::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            download_dir: PathBuf::from("."),
        }
    }
}

/// # Load Configuration File (`load_config`)
///
/// Reads the configuration file. An explicit path must exist; the user file is
/// optional and silently skipped when absent.
///
/// ## Errors
///
/// Returns an error if the explicit file is missing, or if a file cannot be read
/// or is not valid TOML for the schema above.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(anyhow!(XteError::Config(format!(
                "Configuration file '{}' does not exist.",
                path.display()
            ))));
        }
        info!("Loading configuration from: {}", path.display());
        return load_config_from_path(path);
    }
    Ok(load_user_config()?.unwrap_or_default())
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("org", "xtetools", "xtetools") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

/// # Resolve Fetch Configuration (`resolve`)
///
/// Applies command-line overrides on top of the file settings, expands `~` in
/// the download directory and validates the result.
pub fn resolve(file: Config, overrides: FetchOverrides) -> Result<FetchConfig> {
    let ftp = file.ftp;
    let download_dir = match overrides.download_dir {
        Some(dir) => dir,
        None => PathBuf::from(expand_path(&ftp.download_dir)),
    };
    let resolved = FetchConfig {
        host: overrides.host.unwrap_or(ftp.host),
        port: overrides.port.unwrap_or(ftp.port),
        archive_root: ftp.archive_root,
        credentials: Credentials {
            user: overrides.user.unwrap_or(ftp.user),
            password: overrides.password.unwrap_or(ftp.password),
        },
        timeout: Duration::from_secs(overrides.timeout_secs.unwrap_or(ftp.timeout_secs)),
        download_dir,
    };
    validate_config(&resolved).context("Configuration validation failed")?;
    debug!("Resolved fetch configuration: {:?}", resolved);
    Ok(resolved)
}

fn expand_path(raw: &str) -> String {
    shellexpand::tilde(raw).into_owned()
}

fn validate_config(config: &FetchConfig) -> Result<()> {
    if config.host.trim().is_empty() {
        return Err(anyhow!(XteError::Config(
            "FTP host cannot be empty.".to_string()
        )));
    }
    if config.port == 0 {
        return Err(anyhow!(XteError::Config(
            "FTP port must be between 1 and 65535.".to_string()
        )));
    }
    if config.timeout.is_zero() {
        return Err(anyhow!(XteError::Config(
            "timeout_secs must be greater than zero.".to_string()
        )));
    }
    if !config.archive_root.starts_with('/') {
        return Err(anyhow!(XteError::Config(format!(
            "archive_root '{}' must be an absolute remote path.",
            config.archive_root
        ))));
    }
    if config.download_dir.exists() && !config.download_dir.is_dir() {
        return Err(anyhow!(XteError::Config(format!(
            "Download path '{}' exists but is not a directory.",
            config.download_dir.display()
        ))));
    }
    Ok(())
}
