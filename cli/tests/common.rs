//! # xtetools Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`:
//!
//! - `gziptools_cmd()` / `get_xte_obs_cmd()`: `assert_cmd` commands for the two binaries.
//! - `MockFtpServer`: a tiny in-process FTP server (one control connection,
//!   passive mode only) serving an in-memory archive, used to exercise
//!   `get-xte-obs` without touching the network.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::path::PathBuf;
use std::thread::{self, JoinHandle};

/// Environment variables the fetch binary reads; cleared so a developer's
/// shell cannot leak into the tests.
const FETCH_ENV_VARS: [&str; 5] = [
    "XTE_FTP_USER",
    "XTE_FTP_PASSWORD",
    "XTE_FTP_HOST",
    "XTE_FTP_PORT",
    "XTETOOLS_CONFIG",
];

/// # Get gziptools Command (`gziptools_cmd`)
///
/// ## Panics
/// Panics if the `gziptools` binary cannot be found via `Command::cargo_bin`.
pub fn gziptools_cmd() -> Command {
    Command::cargo_bin("gziptools").expect("Failed to find gziptools binary for testing")
}

/// Empty directory used as `HOME` and `XDG_CONFIG_HOME` so the user's own
/// `xtetools/config.toml` is never picked up.
pub fn isolated_home() -> PathBuf {
    let home = PathBuf::from(env!("CARGO_TARGET_TMPDIR")).join("isolated-home");
    std::fs::create_dir_all(&home).expect("create isolated home directory");
    home
}

/// # Get get-xte-obs Command (`get_xte_obs_cmd`)
///
/// The `XTE_FTP_*` / `XTETOOLS_CONFIG` environment variables are removed and
/// the user config location points at `isolated_home()`.
///
/// ## Panics
/// Panics if the `get-xte-obs` binary cannot be found via `Command::cargo_bin`.
pub fn get_xte_obs_cmd() -> Command {
    let mut cmd =
        Command::cargo_bin("get-xte-obs").expect("Failed to find get-xte-obs binary for testing");
    for var in FETCH_ENV_VARS {
        cmd.env_remove(var);
    }
    with_home(&mut cmd, &isolated_home());
    cmd
}

/// Points the user config location of `cmd` at `home`.
pub fn with_home<'a>(cmd: &'a mut Command, home: &std::path::Path) -> &'a mut Command {
    cmd.env("HOME", home).env("XDG_CONFIG_HOME", home.join(".config"))
}

/// Contents and login of the mock archive.
#[derive(Clone, Debug)]
pub struct MockArchive {
    pub user: String,
    pub password: String,
    /// Full remote path -> file content.
    pub files: HashMap<String, Vec<u8>>,
    /// When set, `RETR` sends only this many bytes and then replies `426`.
    pub abort_after: Option<usize>,
}

impl MockArchive {
    /// An archive accepting the default anonymous login.
    pub fn anonymous() -> Self {
        Self {
            user: "anonymous".to_string(),
            password: "anonymous@server.com".to_string(),
            files: HashMap::new(),
            abort_after: None,
        }
    }

    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        self.files.insert(path.to_string(), content.to_vec());
        self
    }

    pub fn aborting_after(mut self, bytes: usize) -> Self {
        self.abort_after = Some(bytes);
        self
    }

    fn has_dir(&self, dir: &str) -> bool {
        let prefix = format!("{}/", dir.trim_end_matches('/'));
        self.files.keys().any(|path| path.starts_with(&prefix))
    }
}

/// # Mock FTP Server (`MockFtpServer`)
///
/// Listens on `127.0.0.1:<port>` and serves exactly one control connection
/// on a background thread. Every command line received is recorded
/// (`PASS` arguments included) and returned by `commands()`.
pub struct MockFtpServer {
    pub port: u16,
    handle: JoinHandle<Vec<String>>,
}

impl MockFtpServer {
    pub fn start(archive: MockArchive) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind mock FTP server");
        let port = listener.local_addr().expect("mock server address").port();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().expect("accept control connection");
            serve(stream, &archive)
        });
        Self { port, handle }
    }

    /// Waits for the session to end and returns the commands received.
    ///
    /// Only call this when the client is expected to have connected.
    pub fn commands(self) -> Vec<String> {
        self.handle.join().expect("mock FTP server thread panicked")
    }
}

fn reply(out: &mut TcpStream, line: &str) {
    out.write_all(format!("{}\r\n", line).as_bytes())
        .expect("write reply");
}

fn serve(stream: TcpStream, archive: &MockArchive) -> Vec<String> {
    let mut out = stream.try_clone().expect("clone control stream");
    let mut reader = BufReader::new(stream);
    let mut seen = Vec::new();
    let mut user = String::new();
    let mut cwd = String::from("/");
    let mut data_listener: Option<TcpListener> = None;

    reply(&mut out, "220-Mock HEASARC archive");
    reply(&mut out, "220 Ready");

    loop {
        let mut line = String::new();
        match reader.read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let line = line.trim_end().to_string();
        seen.push(line.clone());
        let (verb, arg) = match line.split_once(' ') {
            Some((verb, arg)) => (verb.to_string(), arg.to_string()),
            None => (line.clone(), String::new()),
        };

        match verb.as_str() {
            "USER" => {
                user = arg;
                reply(&mut out, "331 Password required");
            }
            "PASS" => {
                if user == archive.user && arg == archive.password {
                    reply(&mut out, "230 Logged in");
                } else {
                    reply(&mut out, "530 Login incorrect.");
                }
            }
            "TYPE" => reply(&mut out, "200 Type set to I"),
            "CWD" => {
                if archive.has_dir(&arg) {
                    cwd = arg;
                    reply(&mut out, "250 CWD command successful");
                } else {
                    reply(&mut out, &format!("550 {}: No such file or directory", arg));
                }
            }
            "PASV" => {
                let listener = TcpListener::bind("127.0.0.1:0").expect("bind data listener");
                let port = listener.local_addr().expect("data address").port();
                data_listener = Some(listener);
                reply(
                    &mut out,
                    &format!(
                        "227 Entering Passive Mode (127,0,0,1,{},{})",
                        port / 256,
                        port % 256
                    ),
                );
            }
            "RETR" => {
                let path = format!("{}/{}", cwd.trim_end_matches('/'), arg);
                let listener = data_listener.take();
                match (archive.files.get(&path), listener) {
                    (Some(content), Some(listener)) => {
                        reply(&mut out, "150 Opening BINARY mode data connection");
                        let (mut data, _) = listener.accept().expect("accept data connection");
                        let sent = match archive.abort_after {
                            Some(limit) => &content[..limit.min(content.len())],
                            None => &content[..],
                        };
                        // The client may already have given up on the data connection.
                        let _ = data.write_all(sent);
                        drop(data);
                        if archive.abort_after.is_some() {
                            reply(&mut out, "426 Connection closed; transfer aborted.");
                        } else {
                            reply(&mut out, "226 Transfer complete");
                        }
                    }
                    (None, _) => {
                        reply(&mut out, &format!("550 {}: No such file or directory", arg))
                    }
                    (Some(_), None) => reply(&mut out, "425 Use PASV first"),
                }
            }
            "QUIT" => {
                reply(&mut out, "221 Goodbye");
                break;
            }
            _ => reply(&mut out, "502 Command not implemented"),
        }
    }
    seen
}
