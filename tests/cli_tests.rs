//! End-to-end runs of the `trigger-swap` binary.

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use trigger_swap::testkit::config::VALID_TOML;

fn workspace(toml: &str) -> TempDir {
    let dir = tempfile::tempdir().expect("create temp dir");
    fs::write(dir.path().join("config.toml"), toml).expect("write config");
    dir
}

fn trigger_swap(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("trigger-swap").expect("binary built");
    cmd.current_dir(dir).env_remove("RPC_URL");
    cmd
}

#[test]
fn check_config_accepts_valid_file() {
    let dir = workspace(VALID_TOML);

    trigger_swap(dir.path())
        .arg("check-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("31337"));
}

#[test]
fn check_config_rejects_zero_capacity() {
    let dir = workspace(&VALID_TOML.replace("worker_capacity = 2", "worker_capacity = 0"));

    trigger_swap(dir.path())
        .arg("check-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("worker_capacity"));
}

#[test]
fn missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();

    trigger_swap(dir.path())
        .args(["check-config", "--config", "nowhere.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nowhere.toml"));
}

#[test]
fn orders_list_on_fresh_database_is_empty_json() {
    let dir = workspace(VALID_TOML);

    trigger_swap(dir.path())
        .args(["--json", "orders", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"orders""#))
        .stdout(predicate::str::contains(r#""payload":[]"#));

    assert!(dir.path().join("orders.db").exists());
}

#[test]
fn cancelling_unknown_order_fails() {
    let dir = workspace(VALID_TOML);

    trigger_swap(dir.path())
        .args(["orders", "cancel", "missing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("order not found: missing"));
}
