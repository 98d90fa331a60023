//! Selection integration tests for fcp CLI.
//!
//! Three sources of 10, 20 and 5 bytes are copied onto a 15 byte quota,
//! which forces a selection.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

struct Fixture {
    src: TempDir,
    dst: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let src = TempDir::new().unwrap();
        fs::write(src.path().join("ten.bin"), vec![1u8; 10]).unwrap();
        fs::create_dir(src.path().join("twenty")).unwrap();
        fs::write(src.path().join("twenty/a.bin"), vec![2u8; 12]).unwrap();
        fs::write(src.path().join("twenty/b.bin"), vec![2u8; 8]).unwrap();
        fs::write(src.path().join("five.bin"), vec![3u8; 5]).unwrap();
        Self {
            src,
            dst: TempDir::new().unwrap(),
        }
    }

    fn command(&self) -> Command {
        let mut cmd = cargo_bin_cmd!("fcp");
        cmd.arg("--no-sync")
            .arg("--quota")
            .arg("15")
            .arg("-t")
            .arg(self.dst.path());
        for name in ["ten.bin", "twenty", "five.bin"] {
            cmd.arg(self.src.path().join(name));
        }
        cmd
    }

    fn copied(&self, name: &str) -> bool {
        self.dst.path().join(name).exists()
    }
}

#[test]
fn test_prompt_select_and_confirm() {
    let fixture = Fixture::new();

    fixture
        .command()
        .write_stdin("1\n3\nc\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Not enough space"))
        .stdout(predicate::str::contains("Selected 2 of 3 items"));

    assert!(fixture.copied("ten.bin"));
    assert!(fixture.copied("five.bin"));
    assert!(!fixture.copied("twenty"));
}

#[test]
fn test_prompt_rejects_item_that_does_not_fit() {
    let fixture = Fixture::new();

    fixture
        .command()
        .write_stdin("1\n2\nc\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Item 2 does not fit"));

    assert!(fixture.copied("ten.bin"));
    assert!(!fixture.copied("twenty"));
    assert!(!fixture.copied("five.bin"));
}

#[test]
fn test_prompt_deselect_frees_space() {
    let fixture = Fixture::new();

    // Select ten, drop it again, then take five alone
    fixture
        .command()
        .write_stdin("1\n1\n3\nc\n")
        .assert()
        .success();

    assert!(!fixture.copied("ten.bin"));
    assert!(fixture.copied("five.bin"));
}

#[test]
fn test_prompt_confirm_nothing() {
    let fixture = Fixture::new();

    fixture
        .command()
        .write_stdin("c\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("No files selected"));

    assert!(fs::read_dir(fixture.dst.path()).unwrap().next().is_none());
}

#[test]
fn test_prompt_quit() {
    let fixture = Fixture::new();

    fixture
        .command()
        .write_stdin("3\nq\n")
        .assert()
        .code(130)
        .stderr(predicate::str::contains("Cancelled"));

    assert!(!fixture.copied("five.bin"));
}

#[test]
fn test_prompt_end_of_input_cancels() {
    let fixture = Fixture::new();

    fixture.command().write_stdin("").assert().code(130);

    assert!(fs::read_dir(fixture.dst.path()).unwrap().next().is_none());
}

#[test]
fn test_prompt_bad_input_is_ignored() {
    let fixture = Fixture::new();

    fixture
        .command()
        .write_stdin("zero\n0\n9\n3\nc\n")
        .assert()
        .success()
        .stderr(predicate::str::contains("Unknown command: zero"))
        .stderr(predicate::str::contains("No item 9"));

    assert!(fixture.copied("five.bin"));
}

#[test]
fn test_fit_mode_keeps_argument_order() {
    let fixture = Fixture::new();

    fixture
        .command()
        .arg("--select")
        .arg("fit")
        .assert()
        .success()
        .stderr(predicate::str::contains("Toggle items").not());

    assert!(fixture.copied("ten.bin"));
    assert!(!fixture.copied("twenty"));
    assert!(fixture.copied("five.bin"));
    assert_eq!(
        fs::read(fixture.dst.path().join("five.bin")).unwrap(),
        vec![3u8; 5]
    );
}
