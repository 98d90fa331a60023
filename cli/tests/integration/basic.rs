//! Basic functionality integration tests for fcp CLI.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_basic_file_copy() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "hello world").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg(src.path().join("test.txt"))
        .arg(dst.path().join("test.txt"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied 1 files (11 B)"));

    assert_eq!(
        fs::read_to_string(dst.path().join("test.txt")).unwrap(),
        "hello world"
    );
}

#[test]
fn test_recursive_directory_copy() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::create_dir_all(src.path().join("subdir/nested")).unwrap();
    fs::write(src.path().join("file1.txt"), "content1").unwrap();
    fs::write(src.path().join("subdir/file2.txt"), "content2").unwrap();
    fs::write(src.path().join("subdir/nested/file3.txt"), "content3").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg(src.path())
        .arg(dst.path().join("copied"))
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dst.path().join("copied/file1.txt")).unwrap(),
        "content1"
    );
    assert_eq!(
        fs::read_to_string(dst.path().join("copied/subdir/file2.txt")).unwrap(),
        "content2"
    );
    assert_eq!(
        fs::read_to_string(dst.path().join("copied/subdir/nested/file3.txt")).unwrap(),
        "content3"
    );
}

#[test]
fn test_copy_into_existing_directory() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("file.txt"), "content").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg(src.path().join("file.txt"))
        .arg(dst.path())
        .assert()
        .success();

    assert!(dst.path().join("file.txt").is_file());
}

#[test]
fn test_copy_multiple_sources() {
    let src1 = TempDir::new().unwrap();
    let src2 = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src1.path().join("file1.txt"), "content1").unwrap();
    fs::write(src2.path().join("file2.txt"), "content2").unwrap();

    // Destination directory is created for several sources
    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg(src1.path().join("file1.txt"))
        .arg(src2.path().join("file2.txt"))
        .arg(dst.path().join("dest"))
        .assert()
        .success();

    assert!(dst.path().join("dest/file1.txt").exists());
    assert!(dst.path().join("dest/file2.txt").exists());
}

#[test]
fn test_target_directory_flag() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("a.txt"), "a").unwrap();
    fs::write(src.path().join("b.txt"), "b").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg("-t")
        .arg(dst.path())
        .arg(src.path().join("a.txt"))
        .arg(src.path().join("b.txt"))
        .assert()
        .success();

    assert!(dst.path().join("a.txt").exists());
    assert!(dst.path().join("b.txt").exists());
}

#[test]
fn test_overwrites_existing_file() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "new").unwrap();
    fs::write(dst.path().join("test.txt"), "old and longer").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg(src.path().join("test.txt"))
        .arg(dst.path().join("test.txt"))
        .assert()
        .success();

    assert_eq!(
        fs::read_to_string(dst.path().join("test.txt")).unwrap(),
        "new"
    );
}

#[test]
fn test_small_chunk_size_copies_whole_file() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    let content: Vec<u8> = (0..10_000u32).map(|i| (i % 256) as u8).collect();
    fs::write(src.path().join("data.bin"), &content).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg("--chunk-size")
        .arg("7")
        .arg(src.path().join("data.bin"))
        .arg(dst.path().join("data.bin"))
        .assert()
        .success();

    assert_eq!(fs::read(dst.path().join("data.bin")).unwrap(), content);
}

#[test]
fn test_verbose_lists_operations() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::create_dir(src.path().join("tree")).unwrap();
    fs::write(src.path().join("tree/a.txt"), "abc").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--no-sync")
        .arg("-v")
        .arg(src.path().join("tree"))
        .arg(dst.path().join("tree"))
        .assert()
        .success()
        .stderr(predicate::str::contains("created "))
        .stderr(predicate::str::contains("(3 bytes)"))
        .stdout(predicate::str::contains("Files copied:   1"));
}

#[test]
fn test_quiet_mode() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();

    fs::write(src.path().join("test.txt"), "content").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--quiet")
        .arg(src.path().join("test.txt"))
        .arg(dst.path().join("test.txt"))
        .assert()
        .success();
    // Note: --quiet only disables progress bars, not summary output

    assert!(dst.path().join("test.txt").exists());
}

#[test]
fn test_help_flag() {
    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("fcp"))
        .stdout(predicate::str::contains("--quota"));
}

#[test]
fn test_version_flag() {
    let mut cmd = cargo_bin_cmd!("fcp");
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fcp"));
}
