//! # xtetools FTP Client (`common::network::ftp`)
//!
//! File: cli/src/common/network/ftp.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! A minimal asynchronous FTP client (RFC 959) covering exactly what a single
//! anonymous download needs: greeting, `USER`/`PASS` login, `TYPE I`,
//! `CWD`, passive-mode `RETR`, and `QUIT`. Every network wait is bounded by
//! the session timeout.
//!
//! ## Architecture
//!
//! - `FtpReply`: a parsed (possibly multi-line) server reply.
//! - `FtpSession`: owns the control connection. Methods translate negative
//!   replies into `XteError` variants (`Authentication`, `RemoteNotFound`,
//!   `Network`, `Protocol`).
//! - Downloads are split in two so the caller only creates its local file
//!   once the server has accepted the request:
//!   1. `begin_retrieve` sends `PASV` + `RETR` and returns the open data connection.
//!   2. `copy_data` streams it into any `AsyncWrite`.
//!   3. `finish_transfer` reads the final `226`.
//!
//! The data connection is made to the control connection's peer address with
//! the port from the `227` reply; the address the server advertises is
//! ignored, which keeps transfers working behind NAT.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use xtetools::common::network::ftp::FtpSession;
//! use xtetools::core::config::Credentials;
//! use std::time::Duration;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let mut session =
//!     FtpSession::connect("heasarc.gsfc.nasa.gov", 21, Duration::from_secs(60)).await?;
//! session.login(&Credentials::default()).await?;
//! session.binary().await?;
//! session.cwd("/xte/data/archive/AO5/P50802").await?;
//! let data = session.begin_retrieve("50802-01-56-98.tar.gz").await?;
//! let mut file = tokio::fs::File::create("50802-01-56-98.tar.gz").await?;
//! session
//!     .copy_data(data, &mut file, std::path::Path::new("50802-01-56-98.tar.gz"))
//!     .await?;
//! session.finish_transfer().await?;
//! session.quit().await?;
//! # Ok(())
//! # }
//! ```
//!
use crate::core::config::Credentials;
use crate::core::error::{Result, XteError};
use anyhow::anyhow;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, trace};

/// FTP reply codes used by the client.
pub mod codes {
    pub const SERVICE_READY_SOON: u16 = 120;
    pub const DATA_CONNECTION_OPEN: u16 = 125;
    pub const FILE_STATUS_OK: u16 = 150;
    pub const COMMAND_OK: u16 = 200;
    pub const READY: u16 = 220;
    pub const SERVICE_CLOSING: u16 = 221;
    pub const TRANSFER_COMPLETE: u16 = 226;
    pub const ENTERING_PASSIVE: u16 = 227;
    pub const LOGGED_IN: u16 = 230;
    pub const FILE_ACTION_OK: u16 = 250;
    pub const NEED_PASSWORD: u16 = 331;
    pub const NEED_ACCOUNT: u16 = 332;
    pub const SERVICE_NOT_AVAILABLE: u16 = 421;
    pub const CANNOT_OPEN_DATA_CONN: u16 = 425;
    pub const CONNECTION_CLOSED: u16 = 426;
    pub const NOT_LOGGED_IN: u16 = 530;
}

/// Size of the buffer used when copying the data connection.
const COPY_BUF_SIZE: usize = 64 * 1024;

/// A server reply: the three-digit code and the full text (all lines).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FtpReply {
    pub code: u16,
    pub text: String,
}

impl FtpReply {
    /// 1xx
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    /// 2xx
    pub fn is_completion(&self) -> bool {
        (200..300).contains(&self.code)
    }

    /// 3xx
    pub fn is_intermediate(&self) -> bool {
        (300..400).contains(&self.code)
    }

    /// 4xx or 5xx
    pub fn is_negative(&self) -> bool {
        self.code >= 400
    }

    /// First line of the reply without the line terminator, for error messages.
    pub fn summary(&self) -> &str {
        self.text.lines().next().unwrap_or("").trim_end()
    }
}

/// Parses the first line of a reply: returns the code and whether more lines follow.
fn parse_reply_start(line: &str) -> Result<(u16, bool)> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(anyhow!(XteError::Protocol(format!(
            "malformed reply line: {:?}",
            line.trim_end()
        ))));
    }
    // Three ASCII digits always parse.
    let code = line[..3].parse::<u16>().unwrap_or_default();
    Ok((code, bytes.get(3) == Some(&b'-')))
}

/// Extracts the data port from a `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` reply.
pub fn parse_pasv_port(text: &str) -> Result<u16> {
    let malformed = || {
        anyhow!(XteError::Protocol(format!(
            "malformed PASV reply: {:?}",
            text.trim_end()
        )))
    };

    let start = text.find('(').ok_or_else(malformed)?;
    let end = text[start..].find(')').ok_or_else(malformed)? + start;
    let numbers = text[start + 1..end]
        .split(',')
        .map(|n| n.trim().parse::<u8>())
        .collect::<std::result::Result<Vec<u8>, _>>()
        .map_err(|_| malformed())?;

    if numbers.len() != 6 {
        return Err(malformed());
    }
    Ok(u16::from(numbers[4]) * 256 + u16::from(numbers[5]))
}

fn io_to_network(what: &str, e: std::io::Error) -> anyhow::Error {
    anyhow!(XteError::Network(format!("{}: {}", what, e)))
}

/// An open FTP control connection.
pub struct FtpSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
    timeout: Duration,
}

impl FtpSession {
    /// Connects to `host:port` and waits for the `220` greeting.
    pub async fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self> {
        let address = format!("{}:{}", host, port);
        debug!("Connecting to FTP server {}", address);

        let stream = tokio::time::timeout(timeout, TcpStream::connect(&address))
            .await
            .map_err(|_| {
                anyhow!(XteError::Network(format!(
                    "connecting to {} timed out after {:?}",
                    address, timeout
                )))
            })?
            .map_err(|e| io_to_network(&format!("failed to connect to {}", address), e))?;

        let peer = stream
            .peer_addr()
            .map_err(|e| io_to_network("failed to read peer address", e))?;
        let (read_half, write_half) = stream.into_split();
        let mut session = Self {
            reader: BufReader::new(read_half),
            writer: write_half,
            peer,
            timeout,
        };

        let mut greeting = session.read_reply().await?;
        // 120: "service ready in nnn minutes", the real greeting follows.
        while greeting.code == codes::SERVICE_READY_SOON {
            greeting = session.read_reply().await?;
        }
        if greeting.code != codes::READY {
            return Err(anyhow!(XteError::Network(format!(
                "server refused the connection: {}",
                greeting.summary()
            ))));
        }
        debug!("Connected to {} ({})", address, peer);
        Ok(session)
    }

    /// Address of the server end of the control connection.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Reads one complete reply, following multi-line replies to their last line.
    async fn read_reply(&mut self) -> Result<FtpReply> {
        let reader = &mut self.reader;
        let reply = with_timeout(self.timeout, "waiting for server reply", async move {
            let mut text = String::new();
            let first = read_line(reader).await?;
            let (code, multiline) = parse_reply_start(&first)?;
            text.push_str(&first);
            if multiline {
                let terminator = format!("{:03} ", code);
                loop {
                    let line = read_line(reader).await?;
                    text.push_str(&line);
                    if line.starts_with(&terminator) {
                        break;
                    }
                }
            }
            Ok(FtpReply { code, text })
        })
        .await?;
        trace!("<-- {}", reply.text.trim_end());
        Ok(reply)
    }

    /// Sends one command line. `PASS` arguments are masked in the log.
    async fn send(&mut self, command: &str) -> Result<()> {
        if command.starts_with("PASS ") {
            debug!("--> PASS ****");
        } else {
            debug!("--> {}", command);
        }
        let line = format!("{}\r\n", command);
        let writer = &mut self.writer;
        with_timeout(self.timeout, "sending command", async move {
            writer
                .write_all(line.as_bytes())
                .await
                .map_err(|e| io_to_network("failed to send command", e))?;
            writer
                .flush()
                .await
                .map_err(|e| io_to_network("failed to flush command", e))
        })
        .await
    }

    /// Sends a command and returns the server's reply.
    pub async fn command(&mut self, command: &str) -> Result<FtpReply> {
        self.send(command).await?;
        let reply = self.read_reply().await?;
        debug!("<-- {}", reply.summary());
        Ok(reply)
    }

    /// Logs in with `USER`, then `PASS` when the server asks for it.
    ///
    /// Any negative reply during login is reported as `XteError::Authentication`,
    /// except `421`, which means the server is closing the connection. A `332`
    /// (account required) is an authentication failure too: no account is
    /// configured, and `ACCT` needs an argument.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<()> {
        let mut reply = self.command(&format!("USER {}", credentials.user)).await?;
        if reply.code == codes::NEED_PASSWORD {
            reply = self
                .command(&format!("PASS {}", credentials.password))
                .await?;
        }
        if reply.code == codes::NEED_ACCOUNT {
            return Err(anyhow!(XteError::Authentication {
                user: credentials.user.clone(),
                reply: reply.summary().to_string(),
            }));
        }

        if reply.code == codes::SERVICE_NOT_AVAILABLE {
            return Err(anyhow!(XteError::Network(format!(
                "server closed the session during login: {}",
                reply.summary()
            ))));
        }
        if reply.is_negative() || reply.is_intermediate() {
            return Err(anyhow!(XteError::Authentication {
                user: credentials.user.clone(),
                reply: reply.summary().to_string(),
            }));
        }
        if !reply.is_completion() {
            return Err(anyhow!(XteError::Protocol(reply.summary().to_string())));
        }
        debug!("Logged in as '{}'", credentials.user);
        Ok(())
    }

    /// Switches to binary (image) transfer type.
    pub async fn binary(&mut self) -> Result<()> {
        let reply = self.command("TYPE I").await?;
        if !reply.is_completion() {
            return Err(anyhow!(XteError::Protocol(format!(
                "TYPE I rejected: {}",
                reply.summary()
            ))));
        }
        Ok(())
    }

    /// Changes the remote working directory.
    pub async fn cwd(&mut self, path: &str) -> Result<()> {
        let reply = self.command(&format!("CWD {}", path)).await?;
        if reply.code == codes::SERVICE_NOT_AVAILABLE {
            return Err(anyhow!(XteError::Network(reply.summary().to_string())));
        }
        if reply.is_negative() {
            return Err(anyhow!(XteError::RemoteNotFound {
                path: path.to_string(),
                reply: reply.summary().to_string(),
            }));
        }
        if !reply.is_completion() {
            return Err(anyhow!(XteError::Protocol(reply.summary().to_string())));
        }
        Ok(())
    }

    /// Enters passive mode and returns the data connection address.
    pub async fn pasv(&mut self) -> Result<SocketAddr> {
        let reply = self.command("PASV").await?;
        if reply.code != codes::ENTERING_PASSIVE {
            return Err(anyhow!(XteError::Protocol(format!(
                "PASV rejected: {}",
                reply.summary()
            ))));
        }
        let port = parse_pasv_port(&reply.text)?;
        Ok(SocketAddr::new(self.peer.ip(), port))
    }

    /// Requests `file_name` and returns the data connection once the server has
    /// accepted the transfer (`125`/`150`).
    pub async fn begin_retrieve(&mut self, file_name: &str) -> Result<TcpStream> {
        let data_addr = self.pasv().await?;
        debug!("Opening data connection to {}", data_addr);
        let data = with_timeout(self.timeout, "opening data connection", async {
            TcpStream::connect(data_addr)
                .await
                .map_err(|e| io_to_network("failed to open data connection", e))
        })
        .await?;

        let reply = self.command(&format!("RETR {}", file_name)).await?;
        match reply.code {
            codes::DATA_CONNECTION_OPEN | codes::FILE_STATUS_OK => Ok(data),
            codes::SERVICE_NOT_AVAILABLE
            | codes::CANNOT_OPEN_DATA_CONN
            | codes::CONNECTION_CLOSED => Err(anyhow!(XteError::Network(format!(
                "RETR failed: {}",
                reply.summary()
            )))),
            _ if reply.is_negative() => Err(anyhow!(XteError::RemoteNotFound {
                path: file_name.to_string(),
                reply: reply.summary().to_string(),
            })),
            _ => Err(anyhow!(XteError::Protocol(format!(
                "unexpected RETR reply: {}",
                reply.summary()
            )))),
        }
    }

    /// Copies the data connection into `sink` until the server closes it.
    ///
    /// Read failures and stalls longer than the session timeout are
    /// `XteError::Network`; write failures are `XteError::LocalWrite` against
    /// `sink_path`.
    pub async fn copy_data<R, W>(
        &self,
        mut data: R,
        sink: &mut W,
        sink_path: &Path,
    ) -> Result<u64>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = vec![0u8; COPY_BUF_SIZE];
        let mut total: u64 = 0;
        loop {
            let n = with_timeout(self.timeout, "reading data connection", async {
                data.read(&mut buf)
                    .await
                    .map_err(|e| io_to_network("data connection failed", e))
            })
            .await?;
            if n == 0 {
                break;
            }
            sink.write_all(&buf[..n])
                .await
                .map_err(|source| XteError::LocalWrite {
                    path: sink_path.to_path_buf(),
                    source,
                })?;
            total += n as u64;
        }
        sink.flush().await.map_err(|source| XteError::LocalWrite {
            path: sink_path.to_path_buf(),
            source,
        })?;
        trace!("Received {} bytes on data connection", total);
        Ok(total)
    }

    /// Reads the reply that ends a transfer; anything but 2xx is an aborted transfer.
    pub async fn finish_transfer(&mut self) -> Result<()> {
        let reply = self.read_reply().await?;
        debug!("<-- {}", reply.summary());
        if !reply.is_completion() {
            return Err(anyhow!(XteError::Network(format!(
                "transfer did not complete: {}",
                reply.summary()
            ))));
        }
        Ok(())
    }

    /// Sends `QUIT` and closes the control connection.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.command("QUIT").await?;
        let _ = self.writer.shutdown().await;
        if reply.code != codes::SERVICE_CLOSING && !reply.is_completion() {
            return Err(anyhow!(XteError::Protocol(format!(
                "QUIT rejected: {}",
                reply.summary()
            ))));
        }
        Ok(())
    }
}

/// Runs `fut`, failing with `XteError::Network` if it takes longer than `timeout`.
async fn with_timeout<T>(
    timeout: Duration,
    what: &str,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(anyhow!(XteError::Network(format!(
            "{} timed out after {:?}",
            what, timeout
        )))),
    }
}

/// Reads one line; EOF before a full line means the server hung up.
async fn read_line(reader: &mut BufReader<OwnedReadHalf>) -> Result<String> {
    let mut line = String::new();
    let n = reader
        .read_line(&mut line)
        .await
        .map_err(|e| io_to_network("failed to read server reply", e))?;
    if n == 0 {
        return Err(anyhow!(XteError::Network(
            "connection closed by server".to_string()
        )));
    }
    Ok(line)
}
