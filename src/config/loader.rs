//! Configuration loader with TOML parsing and environment variable overrides

use super::schema::CellImportConfig;
use super::secret_string;
use crate::domain::errors::CellImportError;
use crate::domain::result::Result;
use regex::Regex;
use std::fs;
use std::path::Path;

/// Loads configuration from a TOML file
///
/// This function:
/// 1. Reads the TOML file
/// 2. Performs environment variable substitution (${VAR} syntax)
/// 3. Parses the TOML into CellImportConfig
/// 4. Applies environment variable overrides (CELL_IMPORT_* prefix)
/// 5. Validates the configuration
///
/// # Errors
///
/// Returns an error if:
/// - File cannot be read
/// - TOML parsing fails
/// - A referenced environment variable is not set
/// - Configuration validation fails
///
/// # Examples
///
/// ```no_run
/// use cell_import::config::loader::load_config;
///
/// let config = load_config("cell-import.toml").expect("Failed to load config");
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<CellImportConfig> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(CellImportError::Configuration(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let contents = fs::read_to_string(path).map_err(|e| {
        CellImportError::Configuration(format!(
            "Failed to read configuration file {}: {}",
            path.display(),
            e
        ))
    })?;

    let contents = substitute_env_vars(&contents)?;

    let mut config: CellImportConfig = toml::from_str(&contents)
        .map_err(|e| CellImportError::Configuration(format!("Failed to parse TOML: {}", e)))?;

    apply_env_overrides(&mut config);

    config.validate().map_err(|e| {
        CellImportError::Configuration(format!("Configuration validation failed: {}", e))
    })?;

    Ok(config)
}

/// Substitutes environment variables in the format ${VAR_NAME}
///
/// Comment lines are copied untouched so that commented-out examples never
/// require the variable to be set.
fn substitute_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
        .map_err(|e| CellImportError::Configuration(e.to_string()))?;
    let mut result = String::with_capacity(input.len());
    let mut missing_vars: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim_start().starts_with('#') {
            result.push_str(line);
            result.push('\n');
            continue;
        }

        let mut processed_line = line.to_string();
        for cap in re.captures_iter(line) {
            let var_name = &cap[1];
            match std::env::var(var_name) {
                Ok(value) => {
                    let placeholder = format!("${{{}}}", var_name);
                    processed_line = processed_line.replace(&placeholder, &value);
                }
                Err(_) => {
                    if !missing_vars.iter().any(|v| v == var_name) {
                        missing_vars.push(var_name.to_string());
                    }
                }
            }
        }
        result.push_str(&processed_line);
        result.push('\n');
    }

    if !missing_vars.is_empty() {
        return Err(CellImportError::Configuration(format!(
            "Missing required environment variables: {}",
            missing_vars.join(", ")
        )));
    }

    Ok(result)
}

/// Applies environment variable overrides using the CELL_IMPORT_* prefix
///
/// Variables follow the pattern `CELL_IMPORT_<SECTION>_<KEY>`, for example
/// `CELL_IMPORT_IDENTITY_BASE_URL`. Values that fail to parse are ignored.
fn apply_env_overrides(config: &mut CellImportConfig) {
    if let Ok(val) = std::env::var("CELL_IMPORT_APPLICATION_LOG_LEVEL") {
        config.application.log_level = val;
    }

    // Import overrides
    if let Ok(val) = std::env::var("CELL_IMPORT_IMPORT_ORGANIZATION_ID") {
        config.import.organization_id = Some(val);
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_IMPORT_DEFAULT_PASSWORD") {
        config.import.default_password = secret_string(val);
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_IMPORT_LINK_CONCURRENCY") {
        if let Ok(concurrency) = val.parse() {
            config.import.link_concurrency = concurrency;
        }
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_IMPORT_LOCK_TTL_SECONDS") {
        if let Ok(ttl) = val.parse() {
            config.import.lock_ttl_seconds = ttl;
        }
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_IMPORT_EXPORT_DIR") {
        config.import.export_dir = val;
    }

    // Identity overrides
    if let Ok(val) = std::env::var("CELL_IMPORT_IDENTITY_BASE_URL") {
        config.identity.base_url = val;
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_IDENTITY_SERVICE_KEY") {
        config.identity.service_key = secret_string(val);
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_IDENTITY_TIMEOUT_SECONDS") {
        if let Ok(timeout) = val.parse() {
            config.identity.timeout_seconds = timeout;
        }
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_IDENTITY_TLS_VERIFY") {
        config.identity.tls_verify = val.parse().unwrap_or(true);
    }

    // PostgreSQL overrides
    if let Ok(val) = std::env::var("CELL_IMPORT_POSTGRESQL_CONNECTION_STRING") {
        config.postgresql.connection_string = secret_string(val);
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_POSTGRESQL_MAX_CONNECTIONS") {
        if let Ok(max) = val.parse() {
            config.postgresql.max_connections = max;
        }
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_POSTGRESQL_SSL_MODE") {
        config.postgresql.ssl_mode = val;
    }

    // Logging overrides
    if let Ok(val) = std::env::var("CELL_IMPORT_LOGGING_LOCAL_ENABLED") {
        config.logging.local_enabled = val.parse().unwrap_or(true);
    }
    if let Ok(val) = std::env::var("CELL_IMPORT_LOGGING_LOCAL_PATH") {
        config.logging.local_path = val;
    }
}
