//! Loading configuration from files on disk.

use std::io::Write;

use oddsdesk::config::Config;
use oddsdesk::error::{ConfigError, Error};
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("create temp file");
    file.write_all(contents.as_bytes()).expect("write config");
    file
}

#[test]
fn loads_sections_from_file() {
    let file = write_config(
        r#"
        [server]
        host = "127.0.0.1"
        port = 8088
        api_version = "v2"
        cors_origins = ["https://book.example"]

        [logging]
        level = "debug"
        format = "json"

        [idempotency]
        ttl_secs = 600
        sweep_interval_secs = 15
        "#,
    );

    let config = Config::load(file.path()).unwrap();

    assert_eq!(config.server.bind_addr(), "127.0.0.1:8088");
    assert_eq!(config.server.api_version, "v2");
    assert_eq!(config.server.cors_origins, vec!["https://book.example"]);
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.idempotency.ttl(), chrono::Duration::minutes(10));
    assert_eq!(
        config.idempotency.sweep_interval(),
        std::time::Duration::from_secs(15)
    );
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();

    assert_eq!(config.idempotency.ttl_secs, 3600);
    assert!(config.server.seed);
}

#[test]
fn missing_file_is_an_error_for_load() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load(dir.path().join("absent.toml")).unwrap_err();

    assert!(matches!(err, Error::Config(ConfigError::ReadFile(_))));
}

#[test]
fn invalid_values_fail_validation() {
    let file = write_config(
        r#"
        [idempotency]
        ttl_secs = 0
        "#,
    );

    let err = Config::load(file.path()).unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidValue {
            field: "ttl_secs",
            ..
        })
    ));
}
