//! # gziptools Integration Tests
//!
//! File: cli/tests/gziptools.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Runs the `gziptools` binary against files in temporary directories and
//! checks the outputs, exit codes and messages.
//!

mod common;
use common::*;
use flate2::read::GzDecoder;
use predicates::prelude::*;
use std::fs;
use std::io::Read;
use tempfile::tempdir;

#[test]
fn test_help_flag() {
    gziptools_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("-c"))
        .stdout(predicate::str::contains("-d"));
}

#[test]
fn test_version_flag() {
    gziptools_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

/// # Test Compress (`test_compress_creates_gz`)
///
/// `gziptools data.bin -c` writes a standard gzip file next to the input and
/// leaves the input alone.
#[test]
fn test_compress_creates_gz() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.bin");
    let payload = b"RXTE light curve bytes \x00\x01\x02".repeat(50);
    fs::write(&input, &payload).unwrap();

    gziptools_cmd()
        .arg(&input)
        .arg("-c")
        .assert()
        .success()
        .stdout(predicate::str::contains("successfully compressed"));

    let gz = fs::read(dir.path().join("data.bin.gz")).unwrap();
    let mut decoder = GzDecoder::new(gz.as_slice());
    let mut decoded = Vec::new();
    decoder.read_to_end(&mut decoded).unwrap();
    assert_eq!(decoded, payload);
    assert_eq!(
        decoder.header().and_then(|h| h.filename()),
        Some(&b"data.bin"[..])
    );
    assert_eq!(fs::read(&input).unwrap(), payload);
}

/// # Test Round Trip (`test_round_trip_through_binary`)
///
/// Compress, remove the original, decompress: the bytes come back unchanged.
#[test]
fn test_round_trip_through_binary() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.bin");
    let payload: Vec<u8> = (0..50_000u32).map(|i| (i * 7 % 256) as u8).collect();
    fs::write(&input, &payload).unwrap();

    gziptools_cmd().arg(&input).arg("-c").assert().success();
    fs::remove_file(&input).unwrap();
    gziptools_cmd()
        .arg(dir.path().join("data.bin.gz"))
        .arg("-d")
        .assert()
        .success()
        .stdout(predicate::str::contains("successfully decompressed"));

    assert_eq!(fs::read(&input).unwrap(), payload);
}

/// Decompressing a file produced by the system `gzip` format (any encoder).
#[test]
fn test_decompress_foreign_gzip() {
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let dir = tempdir().unwrap();
    let gz_path = dir.path().join("events.fits.gz");
    let mut encoder = GzEncoder::new(Vec::new(), Compression::fast());
    encoder.write_all(b"SIMPLE  =                    T").unwrap();
    fs::write(&gz_path, encoder.finish().unwrap()).unwrap();

    gziptools_cmd().arg(&gz_path).arg("-d").assert().success();

    assert_eq!(
        fs::read(dir.path().join("events.fits")).unwrap(),
        b"SIMPLE  =                    T"
    );
}

/// # Test Compress Twice (`test_compress_twice_fails`)
///
/// The second compression must fail and leave the first `.gz` untouched.
#[test]
fn test_compress_twice_fails() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.bin");
    fs::write(&input, b"compress me twice").unwrap();

    gziptools_cmd().arg(&input).arg("-c").assert().success();
    let first = fs::read(dir.path().join("data.bin.gz")).unwrap();

    gziptools_cmd()
        .arg(&input)
        .arg("-c")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read(dir.path().join("data.bin.gz")).unwrap(), first);
}

#[test]
fn test_decompress_does_not_overwrite() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.bin");
    fs::write(&input, b"original").unwrap();
    gziptools_cmd().arg(&input).arg("-c").assert().success();

    gziptools_cmd()
        .arg(dir.path().join("data.bin.gz"))
        .arg("-d")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read(&input).unwrap(), b"original");
}

#[test]
fn test_both_flags_is_usage_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.bin");
    fs::write(&input, b"x").unwrap();

    gziptools_cmd()
        .arg(&input)
        .args(["-c", "-d"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Incompatible methods"));

    assert!(!dir.path().join("data.bin.gz").exists());
}

#[test]
fn test_no_flag_is_usage_error() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.bin");
    fs::write(&input, b"x").unwrap();

    gziptools_cmd()
        .arg(&input)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("No method chosen"));
}

#[test]
fn test_decompress_requires_gz_suffix() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("data.bin");
    fs::write(&input, b"x").unwrap();

    gziptools_cmd()
        .arg(&input)
        .arg("-d")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not end in .gz"));
}

#[test]
fn test_missing_input_fails() {
    let dir = tempdir().unwrap();

    gziptools_cmd()
        .arg(dir.path().join("absent.bin"))
        .arg("-c")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read file"));
}

#[test]
fn test_invalid_level_rejected_by_parser() {
    gziptools_cmd()
        .args(["data.bin", "-c", "--level", "12"])
        .assert()
        .failure();
}
