//! Insufficient-space integration tests for fcp CLI.
//!
//! `--quota` caps the free space the session sees, so these run on any
//! filesystem without mounting a small one.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_single_file_too_large() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("big.bin"), vec![0u8; 50]).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--quota")
        .arg("10")
        .arg(src.path().join("big.bin"))
        .arg(dst.path().join("big.bin"))
        .assert()
        .code(3)
        .stderr(predicate::str::contains("not enough space"))
        // A single item never offers a selection
        .stderr(predicate::str::contains("Toggle items").not());

    assert!(!dst.path().join("big.bin").exists());
}

#[test]
fn test_single_directory_too_large() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::create_dir_all(src.path().join("tree/nested")).unwrap();
    fs::write(src.path().join("tree/a.bin"), vec![0u8; 8]).unwrap();
    fs::write(src.path().join("tree/nested/b.bin"), vec![0u8; 8]).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--quota")
        .arg("15")
        .arg(src.path().join("tree"))
        .arg(dst.path().join("tree"))
        .assert()
        .code(3);

    assert!(!dst.path().join("tree").exists());
}

#[test]
fn test_exact_fit_copies_everything() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.bin"), vec![1u8; 10]).unwrap();
    fs::write(src.path().join("b.bin"), vec![2u8; 5]).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg("--quota")
        .arg("15")
        .arg("-t")
        .arg(dst.path())
        .arg(src.path().join("a.bin"))
        .arg(src.path().join("b.bin"))
        .assert()
        .success()
        .stderr(predicate::str::contains("Toggle items").not());

    assert_eq!(fs::read(dst.path().join("a.bin")).unwrap(), vec![1u8; 10]);
    assert_eq!(fs::read(dst.path().join("b.bin")).unwrap(), vec![2u8; 5]);
}

#[test]
fn test_zero_byte_file_on_full_volume() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("empty"), b"").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg("--quota")
        .arg("0")
        .arg(src.path().join("empty"))
        .arg(dst.path().join("empty"))
        .assert()
        .success();

    assert!(dst.path().join("empty").is_file());
}

#[test]
fn test_empty_directory_is_copied() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::create_dir(src.path().join("hollow")).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg("--quota")
        .arg("0")
        .arg(src.path().join("hollow"))
        .arg(dst.path().join("hollow"))
        .assert()
        .success()
        .stdout(predicate::str::contains("1 dirs"));

    assert!(dst.path().join("hollow").is_dir());
}

#[test]
fn test_explicit_volume() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.bin"), vec![0u8; 4]).unwrap();

    // Free space is measured on the given volume, capped by the quota
    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg("--volume")
        .arg(dst.path())
        .arg("--quota")
        .arg("3")
        .arg(src.path().join("a.bin"))
        .arg(dst.path().join("a.bin"))
        .assert()
        .code(3);
}

#[test]
fn test_missing_volume_is_copy_error() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.bin"), vec![0u8; 4]).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--volume")
        .arg(dst.path().join("no/such/volume"))
        .arg(src.path().join("a.bin"))
        .arg(dst.path().join("a.bin"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to query available space"));

    assert!(!dst.path().join("a.bin").exists());
}
