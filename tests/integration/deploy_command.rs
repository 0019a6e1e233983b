//! Integration tests for `apiary deploy` failure modes that need no
//! running ledger. HOME is redirected into a tempdir so a developer's
//! real config file never leaks into the assertions.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn apiary_with_home(home: &std::path::Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("apiary"));
    cmd.env("NO_COLOR", "1");
    cmd.env("HOME", home);
    cmd.env_remove("APIARY_PROVIDER_URI");
    cmd.env_remove("APIARY_CONFIG");
    cmd
}

#[test]
fn test_deploy_without_provider_is_rejected() {
    let home = tempfile::tempdir().expect("tempdir");
    apiary_with_home(home.path())
        .args(["deploy", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no ledger provider configured"));
}

#[test]
fn test_deploy_unknown_unit_fails_before_any_network_io() {
    let home = tempfile::tempdir().expect("tempdir");
    // No provider flag either: the unit name check must win.
    apiary_with_home(home.path())
        .args(["deploy", "--unit", "vault", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such unit 'vault'"));
}

#[test]
fn test_deploy_unreachable_provider_names_the_ledger_failure() {
    let home = tempfile::tempdir().expect("tempdir");
    apiary_with_home(home.path())
        .args([
            "deploy",
            "--force",
            "--provider-uri",
            "http://127.0.0.1:1/",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("querying ledger accounts"));
}

#[test]
fn test_deploy_reads_provider_from_config_file() {
    let home = tempfile::tempdir().expect("tempdir");
    let config_dir = home.path().join(".apiary");
    std::fs::create_dir_all(&config_dir).expect("config dir");
    std::fs::write(
        config_dir.join("config.yaml"),
        "provider_uri: http://127.0.0.1:1/\n",
    )
    .expect("config file");

    // The configured (unreachable) provider is used, so the failure is a
    // ledger error rather than a missing-provider error.
    apiary_with_home(home.path())
        .args(["deploy", "--force"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("querying ledger accounts"));
}
