//! Loading configuration files from disk.

use std::fs;

use trigger_swap::error::{ConfigError, Error};
use trigger_swap::infrastructure::config::settings::Config;
use trigger_swap::testkit::config::VALID_TOML;

#[test]
fn valid_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, VALID_TOML).unwrap();

    let config = Config::load(&path).unwrap();

    assert_eq!(config.database, "orders.db");
    assert_eq!(config.scheduler.worker_capacity, 2);
    assert_eq!(config.chain.chain_id, 31337);
    assert!(config.broadcast.enabled);
    let settings = config.scheduler.settings();
    assert_eq!(settings.worker_capacity, 2);
}

#[test]
fn missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();

    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))), "{err}");
}

#[test]
fn zero_worker_interval_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let toml = VALID_TOML.replace("worker_interval_secs = 1", "worker_interval_secs = 0");
    fs::write(&path, toml).unwrap();

    let err = Config::load(&path).unwrap_err();

    assert!(
        matches!(err, Error::Config(ConfigError::InvalidValue { field, .. }) if field.contains("worker_interval")),
        "{err}"
    );
}

#[test]
fn missing_router_is_reported() {
    let toml = VALID_TOML.replace(
        "router_address = \"0x7a250d5630B4cF539739dF2C5dAcb4c659F2488D\"\n",
        "",
    );

    let err = Config::parse_toml(&toml).unwrap_err();

    assert!(err.to_string().contains("router"), "{err}");
}
