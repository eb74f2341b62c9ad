//! Import rows and row-level validation errors
//!
//! An [`ImportRow`] is one validated line of the import file. Rows only exist
//! after every field rule has passed, so downstream stages can rely on the
//! email being well-formed and the weekday being one of the seven known values.

use crate::config::SecretString;
use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default generation color (gray) used when `cor_geracao` is blank
pub const DEFAULT_GENERATION_COLOR: &str = "#6B7280";

/// Day of the week on which a cell meets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weekday {
    Domingo,
    Segunda,
    Terca,
    Quarta,
    Quinta,
    Sexta,
    Sabado,
}

impl Weekday {
    /// All accepted values, in calendar order starting on Sunday
    pub const ALL: [Weekday; 7] = [
        Weekday::Domingo,
        Weekday::Segunda,
        Weekday::Terca,
        Weekday::Quarta,
        Weekday::Quinta,
        Weekday::Sexta,
        Weekday::Sabado,
    ];

    /// Canonical stored form
    pub fn as_str(&self) -> &'static str {
        match self {
            Weekday::Domingo => "domingo",
            Weekday::Segunda => "segunda",
            Weekday::Terca => "terca",
            Weekday::Quarta => "quarta",
            Weekday::Quinta => "quinta",
            Weekday::Sexta => "sexta",
            Weekday::Sabado => "sabado",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Weekday {
    type Err = String;

    /// Accepts the canonical names case-insensitively, the accented spellings
    /// (`terça`, `sábado`) and the `-feira` suffix (`segunda-feira`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        let base = lowered
            .strip_suffix("-feira")
            .or_else(|| lowered.strip_suffix(" feira"))
            .unwrap_or(&lowered);
        let folded: String = base
            .chars()
            .map(|c| match c {
                'ç' => 'c',
                'á' | 'à' | 'â' | 'ã' => 'a',
                other => other,
            })
            .collect();

        Weekday::ALL
            .iter()
            .copied()
            .find(|day| day.as_str() == folded)
            .ok_or_else(|| {
                format!(
                    "invalid weekday '{}'; expected one of: {}",
                    s.trim(),
                    Weekday::ALL
                        .iter()
                        .map(|d| d.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )
            })
    }
}

/// One validated record of the import file
#[derive(Debug, Clone)]
pub struct ImportRow {
    /// 1-based position of the data row in the file (header excluded)
    pub index: usize,
    pub generation: String,
    pub generation_color: String,
    pub cell: String,
    pub weekday: Weekday,
    pub time: NaiveTime,
    pub address: Option<String>,
    pub target_audience: Option<String>,
    pub leader_name: String,
    pub leader_email: String,
    pub leader_phone: Option<String>,
    /// Password supplied in the file, if any
    pub password: Option<SecretString>,
}

/// A validation failure for one field of one row
///
/// Row index 0 marks a file-level (structural) error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub row: usize,
    pub field: String,
    pub message: String,
}

impl ValidationError {
    /// Creates a row-level error
    pub fn new(row: usize, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            row,
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a file-level error (row 0)
    pub fn file_level(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(0, field, message)
    }

    /// Whether this error concerns the file as a whole
    pub fn is_file_level(&self) -> bool {
        self.row == 0
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_file_level() {
            write!(f, "file: {}: {}", self.field, self.message)
        } else {
            write!(f, "row {}: {}: {}", self.row, self.field, self.message)
        }
    }
}
