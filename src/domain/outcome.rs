//! Per-row import results
//!
//! Every input row yields exactly one [`ImportResultRow`] at the end of a run,
//! whatever happened to it along the way.

use crate::config::{OneTimeSecret, SecretString};
use crate::domain::ids::LeaderId;
use crate::domain::row::ImportRow;
use serde::Serialize;
use std::fmt;

/// Final status of one input row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportStatus {
    Success,
    Error,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Success => "success",
            ImportStatus::Error => "error",
        }
    }
}

impl fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of importing one row
///
/// The password, when present, can be read exactly once (by the credential
/// export). It is never serialized or printed.
#[derive(Debug)]
pub struct ImportResultRow {
    pub row: usize,
    pub email: String,
    pub name: String,
    pub cell: String,
    pub generation: String,
    pub status: ImportStatus,
    pub message: Option<String>,
    pub leader_id: Option<LeaderId>,
    pub password: OneTimeSecret,
}

impl ImportResultRow {
    /// A successful row carrying the password that was used for the account
    pub fn success(row: &ImportRow, leader_id: LeaderId, password: SecretString) -> Self {
        Self {
            leader_id: Some(leader_id),
            password: OneTimeSecret::new(password),
            ..Self::base(row, ImportStatus::Success, None)
        }
    }

    /// A failed row with a reason
    pub fn error(row: &ImportRow, message: impl Into<String>) -> Self {
        Self::base(row, ImportStatus::Error, Some(message.into()))
    }

    fn base(row: &ImportRow, status: ImportStatus, message: Option<String>) -> Self {
        Self {
            row: row.index,
            email: row.leader_email.clone(),
            name: row.leader_name.clone(),
            cell: row.cell.clone(),
            generation: row.generation.clone(),
            status,
            message,
            leader_id: None,
            password: OneTimeSecret::empty(),
        }
    }

    /// Downgrade a tentatively successful row to an error
    ///
    /// The leader id is kept since the account exists at the identity
    /// provider. The password is dropped: only successful rows carry one.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = ImportStatus::Error;
        self.message = Some(message.into());
        self.password.take();
    }

    pub fn is_success(&self) -> bool {
        self.status == ImportStatus::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::secret_string;
    use crate::domain::row::Weekday;
    use chrono::NaiveTime;

    fn row() -> ImportRow {
        ImportRow {
            index: 2,
            generation: "Geração Azul".to_string(),
            generation_color: "#1D4ED8".to_string(),
            cell: "Célula Esperança".to_string(),
            weekday: Weekday::Quarta,
            time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            address: None,
            target_audience: None,
            leader_name: "Ana Souza".to_string(),
            leader_email: "ana@example.com".to_string(),
            leader_phone: None,
            password: None,
        }
    }

    #[test]
    fn test_success_row_carries_password() {
        let result =
            ImportResultRow::success(&row(), LeaderId::generate(), secret_string("Temp@123".into()));
        assert!(result.is_success());
        assert!(result.password.is_present());
        assert_eq!(result.row, 2);
        assert!(!format!("{result:?}").contains("Temp@123"));
    }

    #[test]
    fn test_error_row_has_no_password() {
        let result = ImportResultRow::error(&row(), "email already registered");
        assert_eq!(result.status, ImportStatus::Error);
        assert!(!result.password.is_present());
        assert_eq!(result.message.as_deref(), Some("email already registered"));
    }

    #[test]
    fn test_fail_drops_password_and_keeps_leader() {
        let mut result =
            ImportResultRow::success(&row(), LeaderId::generate(), secret_string("Temp@123".into()));
        result.fail("cell creation failed: timeout");
        assert_eq!(result.status, ImportStatus::Error);
        assert!(result.leader_id.is_some());
        assert!(!result.password.is_present());
    }
}
