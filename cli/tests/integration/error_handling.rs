//! Error handling integration tests for fcp CLI.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_source_not_found() {
    let dst = TempDir::new().unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("/nonexistent/path/file.txt")
        .arg(dst.path().join("file.txt"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Source does not exist"));

    assert!(!dst.path().join("file.txt").exists());
}

#[test]
fn test_missing_destination_operand() {
    let src = TempDir::new().unwrap();
    fs::write(src.path().join("a.txt"), "a").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg(src.path().join("a.txt"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Missing destination operand"));
}

#[test]
fn test_multi_source_target_is_file() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.txt"), "a").unwrap();
    fs::write(src.path().join("b.txt"), "b").unwrap();
    fs::write(dst.path().join("file"), "not a dir").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg(src.path().join("a.txt"))
        .arg(src.path().join("b.txt"))
        .arg(dst.path().join("file"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("is not a directory"));
}

#[test]
fn test_target_directory_is_file() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.txt"), "a").unwrap();
    fs::write(dst.path().join("file"), "not a dir").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("-t")
        .arg(dst.path().join("file"))
        .arg(src.path().join("a.txt"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Target is not a directory"));
}

#[test]
fn test_missing_destination_parent_is_copy_error() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.txt"), "a").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg(src.path().join("a.txt"))
        .arg(dst.path().join("missing/deeper/a.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to write"))
        .stderr(predicate::str::contains("copy failed"));
}

#[test]
fn test_unknown_select_mode() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.txt"), "a").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--select")
        .arg("largest")
        .arg(src.path().join("a.txt"))
        .arg(dst.path().join("a.txt"))
        .assert()
        .code(2);
}

#[cfg(unix)]
#[test]
fn test_unreadable_source_file() {
    use std::os::unix::fs::PermissionsExt;

    // Root ignores file permissions
    if running_as_root() {
        return;
    }

    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    let file = src.path().join("secret.txt");
    fs::write(&file, "secret").unwrap();
    fs::set_permissions(&file, fs::Permissions::from_mode(0o000)).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg(&file)
        .arg(dst.path().join("secret.txt"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Failed to read"));

    fs::set_permissions(&file, fs::Permissions::from_mode(0o644)).unwrap();
}

#[cfg(unix)]
fn running_as_root() -> bool {
    std::process::Command::new("id")
        .arg("-u")
        .output()
        .map(|o| String::from_utf8_lossy(&o.stdout).trim() == "0")
        .unwrap_or(false)
}
