//! CLI check integration tests
//!
//! These tests run the `restartcheck` binary against container files in a
//! temporary directory and check its exit status and stdout.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use restartcheck_core::container::{Array, Group};
use restartcheck_store::write_container;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn tree(pressure: Vec<f64>, command_line: &str) -> Group {
    Group::new().with_child(
        "Problem",
        Group::new()
            .with_dataset("commandLine", Array::string(command_line))
            .with_dataset("pressure", Array::f64s(pressure)),
    )
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_restartcheck"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI")
}

fn setup(target: Group, baseline: Group) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_container(&dir.path().join("run/plot.json"), &target).unwrap();
    write_container(&dir.path().join("base/plot.json"), &baseline).unwrap();
    dir
}

#[test]
fn test_identical_files_exit_zero() {
    let dir = setup(tree(vec![1.0, 2.0], "a"), tree(vec![1.0, 2.0], "b"));

    let output = run(dir.path(), &["run/plot\\.json", "base/plot\\.json"]);

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.starts_with("Comparison of file run/plot.json from pattern run/plot\\.json\n"));
    assert!(stdout.contains("Excluded groups: ['.*/commandLine', '.*/schema$', '.*/globalToLocalMap', '.*/timeHistoryOutput.*/restart']\n"));
    assert!(stdout.ends_with("The root files and the 1 pairs of files compared are similar.\n"));
    assert!(dir.path().join("run/plot.restartcheck").exists());
}

#[test]
fn test_excursion_exits_one_unless_within_tolerance() {
    let dir = setup(tree(vec![1.0, 2.5], "a"), tree(vec![1.0, 2.0], "a"));

    let strict = run(dir.path(), &["run/plot\\.json", "base/plot\\.json"]);
    assert_eq!(strict.status.code(), Some(1));
    let stdout = String::from_utf8(strict.stdout).unwrap();
    assert!(stdout.contains("Error: /Problem/pressure\n"));
    assert!(stdout.contains("of which 1 is different."));

    let loose = run(dir.path(), &["run/plot\\.json", "base/plot\\.json", "-a", "1.0"]);
    assert_eq!(loose.status.code(), Some(0));
}

#[test]
fn test_exclude_and_skip_missing_flags() {
    let target = Group::new().with_dataset("kept", Array::f64s(vec![1.0]));
    let baseline = Group::new()
        .with_dataset("kept", Array::f64s(vec![1.0]))
        .with_dataset("only_in_baseline", Array::f64s(vec![2.0]))
        .with_dataset("noisy", Array::f64s(vec![3.0]));
    let dir = setup(target, baseline);

    let plain = run(dir.path(), &["run/plot\\.json", "base/plot\\.json"]);
    assert_eq!(plain.status.code(), Some(1));

    let skipping = run(dir.path(), &["run/plot\\.json", "base/plot\\.json", "--skip-missing"]);
    assert_eq!(skipping.status.code(), Some(0));

    let excluding = run(
        dir.path(),
        &["run/plot\\.json", "base/plot\\.json", "-e", "/only_in_baseline", "-e", "/noisy"],
    );
    assert_eq!(excluding.status.code(), Some(0));
}

#[test]
fn test_werror_turns_warnings_into_failures() {
    let target = Group::new()
        .with_dataset("x", Array::f64s(vec![1.0]))
        .with_dataset("extra", Array::f64s(vec![1.0]));
    let baseline = Group::new().with_dataset("x", Array::f64s(vec![1.0]));
    let dir = setup(target, baseline);

    let lenient = run(dir.path(), &["run/plot\\.json", "base/plot\\.json"]);
    assert_eq!(lenient.status.code(), Some(0));
    assert!(String::from_utf8(lenient.stdout).unwrap().contains("Warning: /"));

    let strict = run(dir.path(), &["run/plot\\.json", "base/plot\\.json", "--Werror"]);
    assert_eq!(strict.status.code(), Some(1));
}

#[test]
fn test_no_matching_files_exit_one() {
    let dir = TempDir::new().unwrap();

    let output = run(dir.path(), &["missing_.*", "also_missing"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("No files found matching missing_.*."));
}

#[test]
fn test_negative_tolerance_rejected() {
    let dir = setup(tree(vec![1.0], "a"), tree(vec![1.0], "a"));

    let output = run(dir.path(), &["run/plot\\.json", "base/plot\\.json", "-r", "-0.5"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("ERR_INVALID_TOLERANCE"));
}

#[test]
fn test_json_logs_go_to_stderr() {
    let dir = setup(tree(vec![1.0], "a"), tree(vec![1.0], "a"));

    let output = run(dir.path(), &["run/plot\\.json", "base/plot\\.json", "-j", "2", "--log-format", "json"]);

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(!stdout.contains("\"event\""));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.lines().any(|l| l.contains("\"op\":\"check\"")));
}
