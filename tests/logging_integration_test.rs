//! Integration tests for logging functionality

use medrecord::config::LoggingConfig;
use medrecord::domain::ids::Identifier;
use medrecord::domain::records::RecordStatus;
use medrecord::logging::{init_logging, parse_log_level};
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
}

#[test]
fn test_log_levels() {
    for level in ["trace", "debug", "info", "warn", "error", "INFO"] {
        assert!(parse_log_level(level).is_ok(), "{level} should parse");
    }
    assert!(parse_log_level("verbose").is_err());
}

#[test]
fn test_init_logging_creates_log_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        ..LoggingConfig::default()
    };
    assert!(!log_path.exists());

    // Only one global subscriber can be installed per process; this is the
    // only test in this binary that initializes logging.
    let guard = init_logging("debug", &config).unwrap();
    assert!(log_path.exists());

    // Macros expand against the installed subscriber
    let id = Identifier::generate();
    medrecord::log_aggregation_start!(id, RecordStatus::Export);
    medrecord::log_aggregation_complete!(id, 2usize, Duration::from_millis(15));
    drop(guard);
}
