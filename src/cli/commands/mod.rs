//! CLI command implementations
//!
//! Commands return process exit codes:
//! 0 success, 1 completed with row errors, 2 configuration or validation
//! error, 3 import already in progress, 4 connection error, 5 fatal.

pub mod import;
pub mod init;
pub mod preview;
pub mod template;
pub mod validate;

use crate::config::CellImportConfig;
use crate::domain::{CellImportError, IdentityError, OrganizationId, StoreError};
use std::str::FromStr;

/// Exit code for an error that ended a command
pub fn exit_code_for(error: &CellImportError) -> i32 {
    match error {
        CellImportError::Configuration(_) | CellImportError::Validation(_) => 2,
        CellImportError::ImportInProgress(_) => 3,
        CellImportError::Store(StoreError::ConnectionFailed(_))
        | CellImportError::Identity(IdentityError::ConnectionFailed(_))
        | CellImportError::Identity(IdentityError::Timeout(_)) => 4,
        _ => 5,
    }
}

/// Organization from the command line, falling back to the configuration
pub fn resolve_organization(
    arg: Option<&str>,
    config: &CellImportConfig,
) -> Result<OrganizationId, String> {
    match arg {
        Some(raw) => OrganizationId::from_str(raw),
        None => config.import.default_organization().ok_or_else(|| {
            "no organization given: pass --organization or set import.organization_id".to_string()
        }),
    }
}

/// Read an import file as text
pub fn read_input(path: &str) -> Result<String, CellImportError> {
    std::fs::read_to_string(path)
        .map_err(|e| CellImportError::Io(format!("failed to read {path}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            exit_code_for(&CellImportError::Configuration("x".to_string())),
            2
        );
        assert_eq!(
            exit_code_for(&CellImportError::ImportInProgress("org".to_string())),
            3
        );
        assert_eq!(
            exit_code_for(&CellImportError::Store(StoreError::ConnectionFailed(
                "refused".to_string()
            ))),
            4
        );
        assert_eq!(exit_code_for(&CellImportError::Import("x".to_string())), 5);
    }
}
