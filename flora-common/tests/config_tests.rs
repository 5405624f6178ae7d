//! Unit tests for configuration and graceful degradation
//!
//! Tests cover:
//! - Missing TOML files SHALL NOT cause termination (defaults used)
//! - Partial TOML files keep defaults for absent keys
//! - Malformed TOML files are reported as configuration errors
//! - Priority order for config file resolution (CLI → ENV → platform dir)
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.
//! Tests that manipulate FLORA_CONFIG are marked with #[serial].

use flora_common::config::{
    resolve_config_path, ConfigSource, LoggingConfig, TomlConfig, CONFIG_ENV_VAR,
};
use flora_common::Error;
use serial_test::serial;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = TomlConfig::default();

    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 5730);
    assert_eq!(config.model_path, PathBuf::from("best_mobilenet_v2.onnx"));
    assert_eq!(config.knowledge_path, PathBuf::from("botanical_knowledge.json"));
    assert_eq!(config.max_upload_bytes, 16 * 1024 * 1024);
    assert_eq!(config.intra_threads, 1);
    assert_eq!(config.logging, LoggingConfig::default());
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.file.is_none());
}

#[test]
fn test_missing_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("does-not-exist.toml");

    let config = TomlConfig::load(&missing).expect("missing file should not be fatal");
    assert_eq!(config, TomlConfig::default());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("flora-id.toml");
    fs::write(
        &path,
        r#"
port = 8080
model_path = "/srv/models/plants.onnx"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.port, 8080);
    assert_eq!(config.model_path, PathBuf::from("/srv/models/plants.onnx"));
    assert_eq!(config.logging.level, "debug");

    // Untouched keys
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.knowledge_path, PathBuf::from("botanical_knowledge.json"));
    assert_eq!(config.intra_threads, 1);
}

#[test]
fn test_full_file() {
    let config = TomlConfig::from_toml_str(
        r#"
host = "0.0.0.0"
port = 5000
model_path = "model.onnx"
knowledge_path = "kb.json"
max_upload_bytes = 1024
intra_threads = 4

[logging]
level = "warn"
file = "/var/log/flora-id.log"
"#,
    )
    .unwrap();

    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 5000);
    assert_eq!(config.max_upload_bytes, 1024);
    assert_eq!(config.intra_threads, 4);
    assert_eq!(config.logging.file, Some(PathBuf::from("/var/log/flora-id.log")));
}

#[test]
fn test_malformed_file_is_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    fs::write(&path, "port = \"not a number\"\n[logging\n").unwrap();

    let result = TomlConfig::load(&path);
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_arg_has_highest_priority() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/flora-from-env.toml");

    let cli = Path::new("/tmp/flora-from-cli.toml");
    let resolved = resolve_config_path(Some(cli), "flora-id");
    assert_eq!(resolved, Some(PathBuf::from("/tmp/flora-from-cli.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_env_var_used_without_cli_arg() {
    env::set_var(CONFIG_ENV_VAR, "/tmp/flora-from-env.toml");

    let resolved = resolve_config_path(None, "flora-id");
    assert_eq!(resolved, Some(PathBuf::from("/tmp/flora-from-env.toml")));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolve_and_load_with_env_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("flora-id.toml");
    fs::write(&path, "port = 9999\n").unwrap();
    env::set_var(CONFIG_ENV_VAR, &path);

    let (config, source) = TomlConfig::resolve_and_load(None, "flora-id").unwrap();
    assert_eq!(config.port, 9999);
    assert_eq!(source, ConfigSource::File(path));

    env::remove_var(CONFIG_ENV_VAR);
}

#[test]
#[serial]
fn test_resolve_and_load_reports_missing_file() {
    env::remove_var(CONFIG_ENV_VAR);
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");

    let (config, source) = TomlConfig::resolve_and_load(Some(&missing), "flora-id")
        .expect("missing file should not be fatal");
    assert_eq!(config, TomlConfig::default());
    assert_eq!(source, ConfigSource::MissingFile(missing));
}

#[test]
#[serial]
fn test_resolve_and_load_malformed_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("flora-id.toml");
    fs::write(&path, "port = [").unwrap();

    let result = TomlConfig::resolve_and_load(Some(&path), "flora-id");
    assert!(matches!(result, Err(Error::Config(_))));
}
