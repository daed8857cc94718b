//! CLI tests for the `rewriter` binary.
//!
//! Spawns the binary against fixture trees and checks exit codes and output.

use std::fs;
use std::process::{Command, Stdio};

use rewriter::exit_codes;
use rewriter::test_support::{fixture_tree, read};

fn rewriter() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_rewriter"));
    cmd.env_remove("RUST_LOG");
    cmd
}

#[test]
fn pass_with_changes_exits_ok_and_prints_summary() {
    let dir = fixture_tree(&[("a.h", "int a;\n")]);

    let output = rewriter()
        .current_dir(dir.path())
        .args(["license", "."])
        .output()
        .expect("rewriter license");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("changed: ./a.h"), "{stdout}");
    assert!(stdout.contains("license: scanned 1, changed 1"), "{stdout}");
    assert!(dir.path().join("a.h.bak").exists());
}

#[test]
fn dry_run_json_reports_without_writing() {
    let dir = fixture_tree(&[("CMakeLists.txt", "cmake_minimum_required(VERSION 3.5)\n")]);

    let output = rewriter()
        .current_dir(dir.path())
        .args(["--dry-run", "--json", "cmake-version", "."])
        .output()
        .expect("rewriter cmake-version");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    let summary: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json summary");
    assert_eq!(summary["changed"], 1);
    assert_eq!(summary["dry_run"], true);
    assert_eq!(summary["files"][0]["state"], "dry_run");
    assert_eq!(
        read(&dir.path().join("CMakeLists.txt")),
        "cmake_minimum_required(VERSION 3.5)\n"
    );
}

#[cfg(unix)]
#[test]
fn unreadable_file_exits_with_file_failures() {
    use std::os::unix::fs::PermissionsExt;

    let dir = fixture_tree(&[("a.h", "int a;\n")]);
    let path = dir.path().join("a.h");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o000)).expect("chmod");
    // Running as root ignores permission bits.
    if fs::read(&path).is_ok() {
        return;
    }

    let status = rewriter()
        .current_dir(dir.path())
        .args(["license", "."])
        .stdout(Stdio::null())
        .status()
        .expect("rewriter license");

    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).expect("chmod back");
    assert_eq!(status.code(), Some(exit_codes::FILE_FAILURES));
}

#[test]
fn invalid_config_exits_invalid() {
    let dir = fixture_tree(&[
        ("a.h", "int a;\n"),
        ("bad.toml", "[cmake]\ntarget_version = \"latest\"\n"),
    ]);

    let output = rewriter()
        .current_dir(dir.path())
        .args(["--config", "bad.toml", "license", "."])
        .output()
        .expect("rewriter license");

    assert_eq!(output.status.code(), Some(exit_codes::INVALID));
    assert!(String::from_utf8_lossy(&output.stderr).contains("bad.toml"));
    assert_eq!(read(&dir.path().join("a.h")), "int a;\n");
}

#[test]
fn missing_root_prompt_reads_stdin() {
    let dir = fixture_tree(&[("sdk/a.h", "int a;\n")]);

    let mut child = rewriter()
        .current_dir(dir.path())
        .arg("license")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .expect("spawn rewriter");
    {
        use std::io::Write;
        let mut stdin = child.stdin.take().expect("stdin");
        stdin.write_all(b"sdk\n").expect("write stdin");
    }
    let output = child.wait_with_output().expect("wait");

    assert_eq!(output.status.code(), Some(exit_codes::OK));
    assert!(String::from_utf8_lossy(&output.stdout).contains("Enter the directory to process: "));
    assert!(dir.path().join("sdk/a.h.bak").exists());
}

#[test]
fn empty_prompt_answer_exits_invalid() {
    let dir = fixture_tree(&[]);
    let status = rewriter()
        .current_dir(dir.path())
        .arg("redact")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .expect("rewriter redact");
    assert_eq!(status.code(), Some(exit_codes::INVALID));
}

#[test]
fn init_config_refuses_to_overwrite_without_force() {
    let dir = fixture_tree(&[]);

    let first = rewriter()
        .current_dir(dir.path())
        .arg("init-config")
        .status()
        .expect("init-config");
    assert_eq!(first.code(), Some(exit_codes::OK));
    assert!(dir.path().join(".rewriter.toml").exists());

    let second = rewriter()
        .current_dir(dir.path())
        .arg("init-config")
        .stderr(Stdio::null())
        .status()
        .expect("init-config again");
    assert_eq!(second.code(), Some(exit_codes::INVALID));

    let forced = rewriter()
        .current_dir(dir.path())
        .args(["init-config", "--force"])
        .status()
        .expect("init-config --force");
    assert_eq!(forced.code(), Some(exit_codes::OK));
}

#[test]
fn clean_backups_removes_backup_files() {
    let dir = fixture_tree(&[("a.h", "int a;\n")]);
    rewriter()
        .current_dir(dir.path())
        .args(["license", "."])
        .stdout(Stdio::null())
        .status()
        .expect("license");
    assert!(dir.path().join("a.h.bak").exists());

    let status = rewriter()
        .current_dir(dir.path())
        .args(["clean-backups", "."])
        .stdout(Stdio::null())
        .status()
        .expect("clean-backups");

    assert_eq!(status.code(), Some(exit_codes::OK));
    assert!(!dir.path().join("a.h.bak").exists());
    assert!(dir.path().join("a.h").exists());
}
