//! Integration tests for the apiary CLI surface: help, version, and
//! argument validation that must fail before any network traffic.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn apiary() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("apiary"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    apiary().assert().code(2).stderr(predicate::str::contains(
        "Deployment and swarm orchestration",
    ));
}

#[test]
fn test_cli_help_flag_shows_help() {
    apiary()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    apiary()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("apiary"));
}

#[test]
fn test_version_command_shows_version() {
    apiary()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("apiary 0.1.0"));
}

#[test]
fn test_no_color_env_with_value_one_is_accepted() {
    // The convention sets NO_COLOR=1; that must never trip the flag
    // parser, only disable styling.
    apiary()
        .env("NO_COLOR", "1")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains("apiary 0.1.0"));
}

// --- Command hierarchy tests ---

#[test]
fn test_help_shows_deploy_and_simulate() {
    apiary()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("deploy"))
        .stdout(predicate::str::contains("simulate"));
}

#[test]
fn test_help_hides_the_worker_entrypoint() {
    apiary()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("_worker").not());
}

// --- Argument validation tests ---

#[test]
fn test_simulate_rejects_unknown_backend() {
    apiary()
        .args(["simulate", "--backend", "besu"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a supported simulation backend"))
        .stderr(predicate::str::contains("geth"))
        .stderr(predicate::str::contains("pyevm"));
}

#[test]
fn test_simulate_rejects_non_numeric_node_count() {
    apiary()
        .args(["simulate", "--nodes", "many"])
        .assert()
        .code(2);
}
