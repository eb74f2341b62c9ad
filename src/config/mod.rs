//! Configuration management.
//!
//! TOML-based configuration loading, parsing, and validation with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `CELL_IMPORT_*` environment overrides
//! - Default values for optional settings
//! - Secrets held in zeroizing, redacted wrappers
//!
//! # Example Configuration
//!
//! ```toml
//! environment = "production"
//!
//! [application]
//! log_level = "info"
//!
//! [import]
//! organization_id = "7d44b88c-4199-4bad-97dc-d78268e01398"
//! default_password = "${CELL_IMPORT_DEFAULT_PASSWORD}"
//! export_dir = "/srv/cell-import/exports"
//!
//! [identity]
//! base_url = "https://auth.example.com"
//! service_key = "${CELL_IMPORT_SERVICE_KEY}"
//!
//! [postgresql]
//! connection_string = "${CELL_IMPORT_DATABASE_URL}"
//! ssl_mode = "require"
//! ```
//!
//! # Validation
//!
//! ```rust,no_run
//! use cell_import::config::load_config;
//!
//! match load_config("cell-import.toml") {
//!     Ok(_config) => println!("Configuration valid"),
//!     Err(e) => eprintln!("Configuration error: {}", e),
//! }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::load_config;
pub use schema::{
    ApplicationConfig, CellImportConfig, Environment, IdentityConfig, ImportConfig,
    LoggingConfig, PostgreSQLConfig,
};
pub use secret::{secret_string, secret_string_opt, OneTimeSecret, SecretString, SecretValue};
