//! Integration tests for logging functionality

use cell_import::config::LoggingConfig;
use cell_import::logging::init_logging;
use tempfile::TempDir;

#[test]
fn test_logging_config_default() {
    let config = LoggingConfig::default();
    assert!(config.local_enabled);
    assert_eq!(config.local_rotation, "daily");
    assert_eq!(config.local_path, "/var/log/cell-import");
}

#[test]
fn test_console_only_config() {
    let config = LoggingConfig::console_only();
    assert!(!config.local_enabled);
}

#[test]
fn test_invalid_level_is_rejected_before_init() {
    let result = init_logging("loud", &LoggingConfig::console_only());
    assert!(result.is_err());
}

// The global subscriber can be installed once per process, so this is the
// only test in this binary that initializes logging successfully.
#[test]
fn test_file_logging_creates_directory() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("logs");

    let config = LoggingConfig {
        local_enabled: true,
        local_path: log_path.to_string_lossy().to_string(),
        local_rotation: "hourly".to_string(),
    };
    assert!(!log_path.exists());

    let guard = init_logging("debug", &config).unwrap();
    tracing::info!(stage = "generations", "Logging integration test");
    drop(guard);

    assert!(log_path.is_dir());
}
