//! # xtetools Observation Fetcher
//!
//! File: cli/src/commands/fetch/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! This module implements `get-xte-obs`: it downloads one RXTE observation
//! tarball (`<OBSID>.tar.gz`) from the HEASARC FTP archive into a local
//! directory.
//!
//! ## Architecture
//!
//! - `obsid.rs`: ObsID validation and the AO bucket / remote path derivation
//! - `fetch`: the operation itself, returning a `FetchOutcome`
//! - `handle_fetch`: the command handler; resolves configuration, calls
//!   `fetch` and prints the result
//!
//! ## Examples
//!
//! ```bash
//! # Download as anonymous (HEASARC asks for your e-mail as password)
//! get-xte-obs 50802-01-56-98 -p username@mail.com
//!
//! # Download with a named account into ~/data/xte
//! get-xte-obs 95081-02-56-98 -u username -p secret -o ~/data/xte
//! ```
//!
//! Fetch flow:
//! 1. Validate the ObsID and derive `/xte/data/archive/AO<n>/P<proposal>`
//! 2. Connect and log in
//! 3. `TYPE I`, `CWD` into the observation directory
//! 4. `RETR <OBSID>.tar.gz` into `<OBSID>.tar.gz.part`, renamed on success
//! 5. `QUIT`, on success and on failure alike
//!
use crate::common::fs::io;
use crate::common::network::ftp::FtpSession;
use crate::core::config::{self, Credentials, FetchConfig, FetchOverrides};
use crate::core::error::{Result, XteError};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub mod obsid;

pub use obsid::ObsId;

/// Suffix of the file a download is written to until it completes.
const PARTIAL_SUFFIX: &str = ".part";

/// # Fetch Command Arguments (`FetchArgs`)
///
/// Command-line arguments of `get-xte-obs`. Every option is optional; unset
/// values come from the configuration file or the built-in defaults.
#[derive(Parser, Debug)]
#[command(
    name = "get-xte-obs",
    about = "Download an RXTE observation from the HEASARC archive via FTP",
    long_about = "Download an RXTE observation from the HEASARC archive via FTP.\n\
                  The observation is saved as <OBSID>.tar.gz. HEASARC asks anonymous\n\
                  users to give their e-mail address as password (-p).",
    version
)]
pub struct FetchArgs {
    /// The ObsID to be downloaded (e.g. 50802-01-56-98).
    pub obsid: String,

    /// User for the FTP connection (default: anonymous).
    #[arg(short, long, env = "XTE_FTP_USER")]
    pub user: Option<String>,

    /// Password for the FTP connection. Use your e-mail address when logging in as anonymous.
    #[arg(
        short,
        long,
        visible_alias = "password",
        env = "XTE_FTP_PASSWORD",
        hide_env_values = true
    )]
    pub passwd: Option<String>,

    /// FTP server to download from (default: heasarc.gsfc.nasa.gov).
    #[arg(long, env = "XTE_FTP_HOST")]
    pub host: Option<String>,

    /// FTP control port (default: 21).
    #[arg(long, env = "XTE_FTP_PORT")]
    pub port: Option<u16>,

    /// Seconds to wait on each network step before giving up (default: 60).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Directory to save the tarball in (default: current directory).
    #[arg(short, long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Configuration file to use instead of the user config file.
    #[arg(long, value_name = "FILE", env = "XTETOOLS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl FetchArgs {
    fn overrides(&self) -> FetchOverrides {
        FetchOverrides {
            host: self.host.clone(),
            port: self.port,
            user: self.user.clone(),
            password: self.passwd.clone(),
            timeout_secs: self.timeout,
            download_dir: self.output_dir.clone(),
        }
    }
}

/// What a successful fetch produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Full remote path of the retrieved file.
    pub remote_path: String,
    /// Where the tarball was saved.
    pub local_path: PathBuf,
    /// Number of bytes received.
    pub bytes: u64,
}

/// # Handle Fetch Command (`handle_fetch`)
///
/// Entry point for `get-xte-obs`:
/// 1. Validates the ObsID (before any network activity).
/// 2. Loads and resolves the configuration.
/// 3. Runs `fetch` and reports the outcome on stdout.
pub async fn handle_fetch(args: FetchArgs) -> Result<()> {
    info!("Handling fetch for ObsID {}", args.obsid);

    let obsid = ObsId::parse(&args.obsid)?;
    let file_config = config::load_config(args.config.as_deref())?;
    let fetch_config = config::resolve(file_config, args.overrides())?;

    let remote_dir = obsid.remote_dir(&fetch_config.archive_root);
    println!(
        "Attempting to download file {}/{}",
        remote_dir,
        obsid.archive_name()
    );
    println!("Please wait... this can take a while for large observations.");

    let outcome = fetch(&obsid, &fetch_config).await?;

    println!(
        "File {} successfully downloaded ({} bytes)",
        outcome.local_path.display(),
        outcome.bytes
    );
    Ok(())
}

/// # Fetch an Observation (`fetch`)
///
/// Downloads `<obsid>.tar.gz` from `<archive_root>/AO<n>/P<proposal>` on the
/// configured server into `config.download_dir`.
///
/// The session is always closed with `QUIT` once connected. A failure to
/// close after a successful transfer is logged, the download is kept.
///
/// ## Errors
///
/// - `XteError::Authentication` if the login is rejected.
/// - `XteError::RemoteNotFound` if the directory or file does not exist.
/// - `XteError::LocalWrite` if the local file cannot be created or written.
/// - `XteError::Network` for connection failures, timeouts and aborted transfers.
pub async fn fetch(obsid: &ObsId, config: &FetchConfig) -> Result<FetchOutcome> {
    io::ensure_dir_exists(&config.download_dir)?;
    let remote_dir = obsid.remote_dir(&config.archive_root);
    let file_name = obsid.archive_name();
    let local_path = config.download_dir.join(&file_name);

    let mut session = FtpSession::connect(&config.host, config.port, config.timeout).await?;
    info!("Connected to {}:{}", config.host, config.port);

    let transferred = transfer(
        &mut session,
        &config.credentials,
        &remote_dir,
        &file_name,
        &local_path,
    )
    .await;

    match session.quit().await {
        Ok(()) => debug!("FTP session closed"),
        Err(e) => warn!("FTP session did not close cleanly: {:#}", e),
    }

    let bytes = transferred?;
    info!("Saved {} bytes to {}", bytes, local_path.display());
    Ok(FetchOutcome {
        remote_path: format!("{}/{}", remote_dir, file_name),
        local_path,
        bytes,
    })
}

/// Login, `CWD`, and `RETR` on an open session. The data lands in a `.part`
/// file that is renamed to `local_path` only after the server confirms the
/// transfer; on any failure the partial file is removed.
async fn transfer(
    session: &mut FtpSession,
    credentials: &Credentials,
    remote_dir: &str,
    file_name: &str,
    local_path: &Path,
) -> Result<u64> {
    session.login(credentials).await?;
    session.binary().await?;
    session.cwd(remote_dir).await?;

    let data = session.begin_retrieve(file_name).await?;

    let part_path = partial_path(local_path);
    let mut file = tokio::fs::File::create(&part_path)
        .await
        .map_err(|source| XteError::LocalWrite {
            path: part_path.clone(),
            source,
        })?;

    let received = async {
        let bytes = session.copy_data(data, &mut file, &part_path).await?;
        file.sync_all()
            .await
            .map_err(|source| XteError::LocalWrite {
                path: part_path.clone(),
                source,
            })?;
        session.finish_transfer().await?;
        Ok::<u64, anyhow::Error>(bytes)
    }
    .await;
    drop(file);

    let bytes = match received {
        Ok(bytes) => bytes,
        Err(e) => {
            io::remove_file_quietly(&part_path);
            return Err(e);
        }
    };

    if let Err(source) = tokio::fs::rename(&part_path, local_path).await {
        io::remove_file_quietly(&part_path);
        return Err(XteError::LocalWrite {
            path: local_path.to_path_buf(),
            source,
        }
        .into());
    }
    Ok(bytes)
}

fn partial_path(local_path: &Path) -> PathBuf {
    let mut name = local_path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}
