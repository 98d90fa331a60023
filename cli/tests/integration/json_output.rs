//! JSON output integration tests for fcp CLI.

use assert_cmd::cargo::cargo_bin_cmd;
use serde_json::Value;
use std::fs;
use tempfile::TempDir;

fn parse_stdout(stdout: &[u8]) -> Value {
    serde_json::from_slice(stdout).unwrap()
}

#[test]
fn test_json_success() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::create_dir(src.path().join("tree")).unwrap();
    fs::write(src.path().join("tree/a.txt"), "hello").unwrap();
    fs::write(src.path().join("tree/b.txt"), "world!").unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    let output = cmd
        .arg("--no-sync")
        .arg("--output")
        .arg("json")
        .arg(src.path().join("tree"))
        .arg(dst.path().join("tree"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let payload = parse_stdout(&output.stdout);
    assert_eq!(payload["schema_version"], "1.0");
    assert_eq!(payload["outcome"], "success");
    assert_eq!(payload["files_copied"], 2);
    assert_eq!(payload["dirs_created"], 1);
    assert_eq!(payload["bytes_copied"], 11);
    assert_eq!(payload["items"].as_array().unwrap().len(), 1);
    assert!(payload["required_bytes"].is_null());
}

#[test]
fn test_json_no_space() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("big.bin"), vec![0u8; 50]).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    let output = cmd
        .arg("--output")
        .arg("json")
        .arg("--quota")
        .arg("10")
        .arg(src.path().join("big.bin"))
        .arg(dst.path().join("big.bin"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(3));
    let payload = parse_stdout(&output.stdout);
    assert_eq!(payload["outcome"], "no_space_error");
    assert_eq!(payload["files_copied"], 0);
}

#[test]
fn test_json_fit_selection() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.bin"), vec![0u8; 10]).unwrap();
    fs::write(src.path().join("b.bin"), vec![0u8; 20]).unwrap();
    fs::write(src.path().join("c.bin"), vec![0u8; 5]).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    let output = cmd
        .arg("--no-sync")
        .arg("--output")
        .arg("json")
        .arg("--select")
        .arg("fit")
        .arg("--quota")
        .arg("15")
        .arg("-t")
        .arg(dst.path())
        .arg(src.path().join("a.bin"))
        .arg(src.path().join("b.bin"))
        .arg(src.path().join("c.bin"))
        .output()
        .unwrap();

    assert!(output.status.success());
    let payload = parse_stdout(&output.stdout);
    assert_eq!(payload["outcome"], "success");
    assert_eq!(payload["items_copied"], 2);
    assert_eq!(payload["bytes_copied"], 15);
    assert_eq!(payload["required_bytes"], 35);
    assert_eq!(payload["available_bytes"], 15);
}

#[test]
fn test_json_no_file_selected() {
    let src = TempDir::new().unwrap();
    let dst = TempDir::new().unwrap();
    fs::write(src.path().join("a.bin"), vec![0u8; 10]).unwrap();
    fs::write(src.path().join("b.bin"), vec![0u8; 20]).unwrap();

    let mut cmd = cargo_bin_cmd!("fcp");
    let output = cmd
        .arg("--output")
        .arg("json")
        .arg("--quota")
        .arg("5")
        .arg("-t")
        .arg(dst.path())
        .arg(src.path().join("a.bin"))
        .arg(src.path().join("b.bin"))
        .write_stdin("c\n")
        .output()
        .unwrap();

    assert!(output.status.success());
    let payload = parse_stdout(&output.stdout);
    assert_eq!(payload["outcome"], "no_file_selected");
    assert_eq!(payload["items_copied"], 0);
}
