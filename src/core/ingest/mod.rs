//! Import file validation
//!
//! [`validate_csv`] turns the uploaded text into validated [`ImportRow`]s and
//! a list of [`ValidationError`]s. It never touches the store: the caller only
//! moves on to reconciliation when the error list is empty.
//!
//! ```rust
//! use cell_import::core::ingest::validate_csv;
//!
//! let text = "geracao,celula,dia_semana,horario,lider_nome,lider_email\n\
//!             Azul,Esperança,quarta,19:30,Ana,ana@example.com\n";
//! let validated = validate_csv(text);
//! assert!(validated.is_valid());
//! assert_eq!(validated.rows.len(), 1);
//! ```

pub mod parser;
pub mod rules;
pub mod template;

use crate::domain::{ImportRow, ValidationError, DEFAULT_GENERATION_COLOR};
use parser::ParsedLine;
use rules::FieldRules;
use std::collections::HashSet;

pub use parser::{OPTIONAL_COLUMNS, REQUIRED_COLUMNS};
pub use template::{template_csv, TEMPLATE_FILENAME, TEMPLATE_HEADER};

/// Outcome of validating one file
#[derive(Debug, Default)]
pub struct ValidatedFile {
    /// Rows that passed every rule, in file order
    pub rows: Vec<ImportRow>,
    /// Every problem found, file-level errors first
    pub errors: Vec<ValidationError>,
    /// Number of non-blank data rows read
    pub data_rows: usize,
}

impl ValidatedFile {
    fn structural(errors: Vec<ValidationError>) -> Self {
        Self {
            errors,
            ..Self::default()
        }
    }

    /// Whether the file can be imported
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty() && !self.rows.is_empty()
    }

    /// Whether the file failed before any row was read
    pub fn has_structural_errors(&self) -> bool {
        self.errors.iter().any(|e| e.is_file_level())
    }
}

/// Validate the full text of an import file
pub fn validate_csv(text: &str) -> ValidatedFile {
    validate_csv_with_default_color(text, DEFAULT_GENERATION_COLOR)
}

/// Validate with a custom color for rows that leave `cor_geracao` blank
pub fn validate_csv_with_default_color(text: &str, default_color: &str) -> ValidatedFile {
    let stripped = text.strip_prefix('\u{feff}').unwrap_or(text);
    if stripped.trim().is_empty() {
        return ValidatedFile::structural(vec![ValidationError::file_level(
            "file",
            "file is empty",
        )]);
    }

    let lines = match parser::parse(stripped) {
        Ok(lines) => lines,
        Err(errors) => return ValidatedFile::structural(errors),
    };

    if lines.is_empty() {
        return ValidatedFile::structural(vec![ValidationError::file_level(
            "file",
            "file has no data rows",
        )]);
    }

    let rules = match FieldRules::new() {
        Ok(rules) => rules.with_default_color(default_color),
        Err(e) => {
            return ValidatedFile::structural(vec![ValidationError::file_level(
                "file",
                format!("validator unavailable: {e}"),
            )])
        }
    };

    let mut validated = ValidatedFile {
        data_rows: lines.len(),
        ..ValidatedFile::default()
    };
    let mut seen_emails: HashSet<String> = HashSet::new();

    for line in lines {
        let record = match line {
            ParsedLine::Record(record) => record,
            ParsedLine::Unreadable { index, message } => {
                validated
                    .errors
                    .push(ValidationError::new(index, "row", message));
                continue;
            }
        };

        let duplicate = match record.get("lider_email") {
            Some(email) => !seen_emails.insert(email.to_string()),
            None => false,
        };

        match rules.check(&record) {
            Ok(row) if !duplicate => validated.rows.push(row),
            Ok(_) => {}
            Err(errors) => validated.errors.extend(errors),
        }

        if duplicate {
            validated.errors.push(ValidationError::new(
                record.index,
                "lider_email",
                format!(
                    "duplicate email '{}' already used by an earlier row",
                    record.get("lider_email").unwrap_or_default()
                ),
            ));
        }
    }

    tracing::debug!(
        data_rows = validated.data_rows,
        valid_rows = validated.rows.len(),
        errors = validated.errors.len(),
        "Import file validated"
    );

    validated
}
