//! Credential export
//!
//! Temporary leader passwords are shown once. Rendering reads them without
//! consuming; [`discard_passwords`] drops them from the result rows once the
//! file is safely on disk. Only successful rows carry a password into the file.

use crate::config::{secret_string, SecretString};
use crate::domain::{CellImportError, ImportResultRow, Result};
use chrono::NaiveDateTime;
use secrecy::ExposeSecret;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Header of the credentials file
pub const CREDENTIALS_HEADER: [&str; 7] = [
    "nome",
    "email",
    "senha_temporaria",
    "celula",
    "geracao",
    "status",
    "observacao",
];

const BOM: &str = "\u{feff}";

/// Numbered alternatives tried when the filename is already taken
const MAX_NAME_ATTEMPTS: usize = 100;

/// A rendered credentials file
///
/// The content holds passwords and is zeroized on drop.
#[derive(Debug)]
pub struct CredentialExport {
    pub filename: String,
    pub rows: usize,
    pub passwords: usize,
    content: SecretString,
}

impl CredentialExport {
    /// File content, byte-order mark included
    pub fn content(&self) -> &str {
        self.content.expose_secret().as_str()
    }

    /// Write the file into `dir`
    ///
    /// Existing files are never overwritten. When `filename` is taken the
    /// export goes to `<stem>_2.csv`, `<stem>_3.csv` and so on.
    ///
    /// # Errors
    ///
    /// Fails when the directory cannot be created or written, or when no free
    /// name is found.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir)?;

        let (path, mut file) = self.create_unique(dir)?;
        file.write_all(self.content().as_bytes())?;
        file.flush()?;

        tracing::info!(
            path = %path.display(),
            rows = self.rows,
            passwords = self.passwords,
            "Credential export written"
        );
        Ok(path)
    }

    fn create_unique(&self, dir: &Path) -> Result<(PathBuf, File)> {
        let stem = self.filename.trim_end_matches(".csv");

        for attempt in 1..=MAX_NAME_ATTEMPTS {
            let path = if attempt == 1 {
                dir.join(&self.filename)
            } else {
                dir.join(format!("{stem}_{attempt}.csv"))
            };

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(CellImportError::Io(format!(
                        "failed to create {}: {e}",
                        path.display()
                    )))
                }
            }
        }

        Err(CellImportError::Io(format!(
            "no free name for {} in {}",
            self.filename,
            dir.display()
        )))
    }
}

/// Filename for an export made at `created_at`
pub fn credentials_filename(created_at: NaiveDateTime) -> String {
    format!(
        "credenciais_lideres_{}.csv",
        created_at.format("%Y-%m-%d_%H%M%S")
    )
}

/// Render one line per result row
///
/// Passwords are read, not consumed: call [`discard_passwords`] after the
/// export has been persisted.
pub fn export_credentials(
    results: &[ImportResultRow],
    created_at: NaiveDateTime,
) -> Result<CredentialExport> {
    let mut writer = csv::WriterBuilder::new().from_writer(BOM.as_bytes().to_vec());
    writer.write_record(CREDENTIALS_HEADER)?;

    let mut passwords = 0;
    for result in results {
        let password = if result.is_success() {
            result.password.peek()
        } else {
            None
        };
        if password.is_some() {
            passwords += 1;
        }
        writer.write_record([
            result.name.as_str(),
            result.email.as_str(),
            password
                .map(|p| p.expose_secret().as_str())
                .unwrap_or_default(),
            result.cell.as_str(),
            result.generation.as_str(),
            result.status.as_str(),
            result.message.as_deref().unwrap_or_default(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CellImportError::Csv(format!("failed to finish credential export: {e}")))?;
    let content = String::from_utf8(bytes)
        .map_err(|e| CellImportError::Csv(format!("credential export is not UTF-8: {e}")))?;

    Ok(CredentialExport {
        filename: credentials_filename(created_at),
        rows: results.len(),
        passwords,
        content: secret_string(content),
    })
}

/// Drop every password still held by `results`, returning how many were dropped
pub fn discard_passwords(results: &mut [ImportResultRow]) -> usize {
    results
        .iter_mut()
        .filter_map(|result| result.password.take())
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ImportRow, LeaderId, Weekday};
    use chrono::{NaiveDate, NaiveTime};
    use tempfile::TempDir;

    fn row(index: usize, email: &str) -> ImportRow {
        ImportRow {
            index,
            generation: "Geração Azul".to_string(),
            generation_color: "#1D4ED8".to_string(),
            cell: format!("Célula {index}"),
            weekday: Weekday::Quarta,
            time: NaiveTime::from_hms_opt(19, 30, 0).unwrap(),
            address: None,
            target_audience: None,
            leader_name: "Ana, Souza".to_string(),
            leader_email: email.to_string(),
            leader_phone: None,
            password: None,
        }
    }

    fn results() -> Vec<ImportResultRow> {
        vec![
            ImportResultRow::success(
                &row(1, "ana@example.com"),
                LeaderId::generate(),
                secret_string("Temp@123".to_string()),
            ),
            ImportResultRow::error(&row(2, "bruno@example.com"), "email already registered"),
        ]
    }

    fn created_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 7)
            .unwrap()
    }

    #[test]
    fn test_export_layout() {
        let results = results();
        let export = export_credentials(&results, created_at()).unwrap();

        assert_eq!(export.filename, "credenciais_lideres_2024-03-09_140507.csv");
        assert!(export.content().starts_with('\u{feff}'));

        let lines: Vec<&str> = export.content().trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines[0], "nome,email,senha_temporaria,celula,geracao,status,observacao");
        assert_eq!(
            lines[1],
            "\"Ana, Souza\",ana@example.com,Temp@123,Célula 1,Geração Azul,success,"
        );
        assert_eq!(
            lines[2],
            "\"Ana, Souza\",bruno@example.com,,Célula 2,Geração Azul,error,email already registered"
        );
        assert_eq!(export.rows, 2);
        assert_eq!(export.passwords, 1);
    }

    #[test]
    fn test_render_keeps_passwords_until_discarded() {
        let mut results = results();
        export_credentials(&results, created_at()).unwrap();
        assert!(results[0].password.is_present());

        assert_eq!(discard_passwords(&mut results), 1);
        assert!(results.iter().all(|r| !r.password.is_present()));

        let second = export_credentials(&results, created_at()).unwrap();
        assert_eq!(second.passwords, 0);
        assert!(!second.content().contains("Temp@123"));
    }

    #[test]
    fn test_error_rows_never_export_a_password() {
        let mut results = results();
        results.push(ImportResultRow::success(
            &row(3, "carla@example.com"),
            LeaderId::generate(),
            secret_string("Carla@999".to_string()),
        ));
        // Bypass `fail` so the row still holds its secret
        results[2].status = crate::domain::ImportStatus::Error;

        let export = export_credentials(&results, created_at()).unwrap();
        assert!(!export.content().contains("Carla@999"));
        assert_eq!(export.passwords, 1);
    }

    #[test]
    fn test_debug_does_not_show_content() {
        let results = results();
        let export = export_credentials(&results, created_at()).unwrap();
        assert!(!format!("{export:?}").contains("Temp@123"));
    }

    #[test]
    fn test_write_to_dir_never_overwrites() {
        let dir = TempDir::new().unwrap();
        let results = results();
        let export = export_credentials(&results, created_at()).unwrap();

        let first = export.write_to_dir(dir.path()).unwrap();
        assert_eq!(std::fs::read_to_string(&first).unwrap(), export.content());

        let second = export.write_to_dir(dir.path()).unwrap();
        assert_ne!(first, second);
        assert_eq!(
            second.file_name().unwrap(),
            "credenciais_lideres_2024-03-09_140507_2.csv"
        );
        assert_eq!(std::fs::read_to_string(&first).unwrap(), export.content());
    }
}
