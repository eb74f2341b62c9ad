//! Logging and observability
//!
//! Structured logging through `tracing` with:
//! - Console output with configurable log levels
//! - Local JSON file logging with rotation
//!
//! # Example
//!
//! ```no_run
//! use cell_import::logging::init_logging;
//! use cell_import::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an import stage
///
/// # Example
///
/// ```no_run
/// use cell_import::log_stage_start;
///
/// log_stage_start!("generations", 3);
/// ```
#[macro_export]
macro_rules! log_stage_start {
    ($stage:expr, $items:expr) => {
        tracing::info!(stage = $stage, items = $items, "Starting import stage");
    };
}

/// Log the completion of an import stage
///
/// # Example
///
/// ```no_run
/// use cell_import::log_stage_complete;
///
/// log_stage_complete!("cells", 12, 0);
/// ```
#[macro_export]
macro_rules! log_stage_complete {
    ($stage:expr, $succeeded:expr, $failed:expr) => {
        tracing::info!(
            stage = $stage,
            succeeded = $succeeded,
            failed = $failed,
            "Import stage completed"
        );
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use cell_import::log_error_with_context;
/// use cell_import::domain::CellImportError;
///
/// let error = CellImportError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = $context,
            "Error occurred"
        );
    };
}
