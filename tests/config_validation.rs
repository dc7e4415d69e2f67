//! Integration tests for loading configuration from disk
//!
//! Each failure phase (read, parse, validate) must name the file involved.

use roster::config::Config;
use roster::error::AppError;
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("Failed to write config");
    path
}

#[test]
fn test_missing_file_reports_read_error_with_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, AppError::ConfigFileRead { .. }), "{:?}", err);
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_invalid_toml_reports_parse_error_with_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[server\nport = 3000\n");

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, AppError::ConfigParseFailed { .. }), "{:?}", err);
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn test_wrong_type_reports_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[server]\nport = \"three thousand\"\n");

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, AppError::ConfigParseFailed { .. }), "{:?}", err);
}

#[test]
fn test_port_out_of_range_reports_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[server]\nport = 70000\n");

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, AppError::ConfigParseFailed { .. }), "{:?}", err);
}

#[test]
fn test_semantic_error_reports_validation_failure_with_reason() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[observability]\nlog_level = \"chatty\"\n");

    let err = Config::from_file(&path).unwrap_err();
    match err {
        AppError::ConfigValidationFailed { path, reason } => {
            assert!(path.ends_with("config.toml"));
            assert!(reason.contains("log_level"), "{}", reason);
        }
        other => panic!("expected ConfigValidationFailed, got {:?}", other),
    }
}

#[test]
fn test_partial_file_fills_in_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[storage]\npath = \"records/db.json\"\nstrict_load = true\n");

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.storage.path, std::path::PathBuf::from("records/db.json"));
    assert!(config.storage.strict_load);
}
