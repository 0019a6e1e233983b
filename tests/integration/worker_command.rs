//! Integration tests for the hidden `_worker` entrypoint's parameter
//! validation. Valid workers park until signalled, so only the invalid
//! combinations are exercised end to end.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn apiary() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("apiary"));
    cmd.env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_worker_requires_address_outside_federated_mode() {
    apiary()
        .args(["_worker", "--rest-port", "8787", "--db-name", "sim-8787"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--checksum-address"));
}

#[test]
fn test_worker_requires_full_stake_outside_federated_mode() {
    apiary()
        .args([
            "_worker",
            "--rest-port",
            "8787",
            "--db-name",
            "sim-8787",
            "--checksum-address",
            "0xnode0",
            "--stake-value",
            "20000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--stake-periods"));
}

#[test]
fn test_federated_worker_rejects_stake_parameters() {
    apiary()
        .args([
            "_worker",
            "--rest-port",
            "8787",
            "--db-name",
            "sim-8787",
            "--federated",
            "--stake-value",
            "20000",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no address and no stake"));
}

#[test]
fn test_worker_rejects_out_of_range_port() {
    apiary()
        .args(["_worker", "--rest-port", "70000", "--db-name", "sim"])
        .assert()
        .code(2);
}
