//! Domain error types
//!
//! This module defines the error hierarchy for the import pipeline.
//! All errors are domain-specific and don't expose third-party types.

use thiserror::Error;

/// Main error type
///
/// This is the primary error type used throughout the crate.
/// It wraps the adapter-specific error types and provides context for error handling.
#[derive(Debug, Error)]
pub enum CellImportError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input validation errors (structural or row-level)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Relational store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Identity provider errors
    #[error("Identity provider error: {0}")]
    Identity(#[from] IdentityError),

    /// Pipeline-level failures that abort a run
    #[error("Import error: {0}")]
    Import(String),

    /// Another run holds the import lock for the organization
    #[error("An import is already in progress for organization {0}")]
    ImportInProgress(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Delimited text reading or writing errors
    #[error("CSV error: {0}")]
    Csv(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Relational store errors
///
/// Errors that occur when reading from or writing to the organization store.
/// These errors don't expose the database driver types.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to connect or obtain a pooled connection
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// Failed to query records
    #[error("Failed to query records: {0}")]
    QueryFailed(String),

    /// Failed to insert records
    #[error("Failed to insert records: {0}")]
    InsertFailed(String),

    /// Failed to update a record
    #[error("Failed to update record: {0}")]
    UpdateFailed(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Unique constraint violation
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Schema migration failed
    #[error("Failed to apply schema: {0}")]
    MigrationFailed(String),
}

/// Identity provider errors
///
/// Errors that occur when calling the account provisioning endpoint.
/// These errors don't expose third-party HTTP client types.
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Failed to connect to the identity provider
    #[error("Failed to connect to identity provider: {0}")]
    ConnectionFailed(String),

    /// Authentication with the provider failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Response body could not be interpreted
    #[error("Invalid response from identity provider: {0}")]
    InvalidResponse(String),

    /// Server error (5xx)
    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    /// Client error (4xx)
    #[error("Client error: {status} - {message}")]
    ClientError { status: u16, message: String },

    /// Timeout
    #[error("Request timeout: {0}")]
    Timeout(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for CellImportError {
    fn from(err: std::io::Error) -> Self {
        CellImportError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for CellImportError {
    fn from(err: serde_json::Error) -> Self {
        CellImportError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for CellImportError {
    fn from(err: toml::de::Error) -> Self {
        CellImportError::Configuration(format!("TOML parse error: {err}"))
    }
}

// Conversion from csv errors
impl From<csv::Error> for CellImportError {
    fn from(err: csv::Error) -> Self {
        CellImportError::Csv(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CellImportError::Configuration("Invalid config".to_string());
        assert_eq!(err.to_string(), "Configuration error: Invalid config");
    }

    #[test]
    fn test_store_error_conversion() {
        let store_err = StoreError::InsertFailed("duplicate key".to_string());
        let err: CellImportError = store_err.into();
        assert!(matches!(err, CellImportError::Store(_)));
        assert!(err.to_string().contains("duplicate key"));
    }

    #[test]
    fn test_identity_error_conversion() {
        let identity_err = IdentityError::ServerError {
            status: 502,
            message: "bad gateway".to_string(),
        };
        let err: CellImportError = identity_err.into();
        assert!(matches!(err, CellImportError::Identity(_)));
        assert_eq!(
            err.to_string(),
            "Identity provider error: Server error: 502 - bad gateway"
        );
    }

    #[test]
    fn test_import_in_progress_display() {
        let err = CellImportError::ImportInProgress("org-1".to_string());
        assert!(err.to_string().contains("already in progress"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let err: CellImportError = io_err.into();
        assert!(matches!(err, CellImportError::Io(_)));
    }

    #[test]
    fn test_serde_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err: CellImportError = json_err.into();
        assert!(matches!(err, CellImportError::Serialization(_)));
    }

    #[test]
    fn test_toml_error_conversion() {
        let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
        let err: CellImportError = toml_err.into();
        assert!(matches!(err, CellImportError::Configuration(_)));
        assert!(err.to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_errors_implement_std_error() {
        let _: &dyn std::error::Error = &CellImportError::Validation("x".to_string());
        let _: &dyn std::error::Error = &StoreError::NotFound("x".to_string());
        let _: &dyn std::error::Error = &IdentityError::Timeout("x".to_string());
    }
}
