//! Delimited text reading
//!
//! Turns the raw file text into header-mapped records. Field rules are
//! applied later by [`super::rules`].

use crate::domain::ValidationError;
use std::collections::HashMap;

/// Columns every file must carry
pub const REQUIRED_COLUMNS: [&str; 6] = [
    "geracao",
    "celula",
    "dia_semana",
    "horario",
    "lider_nome",
    "lider_email",
];

/// Columns that may be absent
pub const OPTIONAL_COLUMNS: [&str; 5] = [
    "cor_geracao",
    "endereco",
    "publico_alvo",
    "lider_telefone",
    "senha",
];

/// One data line, keyed by known column name
#[derive(Debug, Clone)]
pub struct RawRecord {
    /// 1-based data-row index
    pub index: usize,
    values: HashMap<&'static str, String>,
}

impl RawRecord {
    /// Trimmed value of `column`, `None` when absent or blank
    pub fn get(&self, column: &str) -> Option<&str> {
        self.values
            .get(column)
            .map(|v| v.as_str())
            .filter(|v| !v.is_empty())
    }
}

/// A data line as read from the file
#[derive(Debug)]
pub enum ParsedLine {
    Record(RawRecord),
    Unreadable { index: usize, message: String },
}

/// Pick `;` for semicolon-separated exports, `,` otherwise
pub fn detect_delimiter(header_line: &str) -> u8 {
    if header_line.contains(';') && !header_line.contains(',') {
        b';'
    } else {
        b','
    }
}

/// Read the header and every data line
///
/// Structural problems (unreadable header, missing required columns) are
/// returned as file-level errors.
pub fn parse(text: &str) -> Result<Vec<ParsedLine>, Vec<ValidationError>> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let header_line = text.lines().next().unwrap_or_default();

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(detect_delimiter(header_line))
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader.headers().map_err(|e| {
        vec![ValidationError::file_level(
            "header",
            format!("could not read header: {e}"),
        )]
    })?;

    let columns = map_columns(headers);

    let missing: Vec<ValidationError> = REQUIRED_COLUMNS
        .iter()
        .filter(|c| !columns.contains_key(*c))
        .map(|c| ValidationError::file_level("header", format!("missing required column '{c}'")))
        .collect();
    if !missing.is_empty() {
        return Err(missing);
    }

    let mut lines = Vec::new();
    let mut index = 0;
    for result in reader.records() {
        match result {
            Ok(record) => {
                if record.iter().all(|f| f.is_empty()) {
                    continue;
                }
                index += 1;
                let values = columns
                    .iter()
                    .map(|(name, pos)| (*name, record.get(*pos).unwrap_or_default().to_string()))
                    .collect();
                lines.push(ParsedLine::Record(RawRecord { index, values }));
            }
            Err(e) => {
                index += 1;
                lines.push(ParsedLine::Unreadable {
                    index,
                    message: format!("could not read record: {e}"),
                });
            }
        }
    }

    Ok(lines)
}

fn map_columns(headers: &csv::StringRecord) -> HashMap<&'static str, usize> {
    let mut columns = HashMap::new();
    for (pos, header) in headers.iter().enumerate() {
        let header = header.trim().to_lowercase();
        if let Some(known) = REQUIRED_COLUMNS
            .iter()
            .chain(OPTIONAL_COLUMNS.iter())
            .find(|c| **c == header)
        {
            // First occurrence wins when a column is repeated
            columns.entry(*known).or_insert(pos);
        }
    }
    columns
}
