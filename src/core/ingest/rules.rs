//! Field rules for one record
//!
//! Every rule runs independently so a row reports all of its problems at once.

use super::parser::RawRecord;
use crate::config::secret_string;
use crate::domain::{ImportRow, ValidationError, Weekday, DEFAULT_GENERATION_COLOR};
use chrono::NaiveTime;
use regex::Regex;

const MAX_NAME_LEN: usize = 100;
const MAX_TEXT_LEN: usize = 255;
const MIN_PHONE_DIGITS: usize = 10;
const MAX_PHONE_DIGITS: usize = 15;

/// Compiled field patterns
pub struct FieldRules {
    email: Regex,
    color: Regex,
    time: Regex,
    default_color: String,
}

impl FieldRules {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            email: Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")?,
            color: Regex::new(r"^#[0-9A-Fa-f]{6}$")?,
            time: Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$")?,
            default_color: DEFAULT_GENERATION_COLOR.to_string(),
        })
    }

    /// Color given to rows that leave `cor_geracao` blank
    pub fn with_default_color(mut self, color: impl Into<String>) -> Self {
        self.default_color = color.into();
        self
    }

    /// Apply every field rule to `record`
    pub fn check(&self, record: &RawRecord) -> Result<ImportRow, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let row = record.index;
        let mut fail = |field: &str, message: String| {
            errors.push(ValidationError::new(row, field, message));
        };

        let generation = required_text(record, "geracao", MAX_NAME_LEN, &mut fail);
        let cell = required_text(record, "celula", MAX_NAME_LEN, &mut fail);
        let leader_name = required_text(record, "lider_nome", MAX_NAME_LEN, &mut fail);
        let address = optional_text(record, "endereco", MAX_TEXT_LEN, &mut fail);
        let target_audience = optional_text(record, "publico_alvo", MAX_TEXT_LEN, &mut fail);

        let generation_color = match record.get("cor_geracao") {
            None => Some(self.default_color.clone()),
            Some(c) if self.color.is_match(c) => Some(c.to_string()),
            Some(c) => {
                fail("cor_geracao", format!("invalid color '{c}'; expected #RRGGBB"));
                None
            }
        };

        let weekday = match record.get("dia_semana") {
            None => {
                fail("dia_semana", "is required".to_string());
                None
            }
            Some(d) => match d.parse::<Weekday>() {
                Ok(day) => Some(day),
                Err(e) => {
                    fail("dia_semana", e);
                    None
                }
            },
        };

        let time = match record.get("horario") {
            None => {
                fail("horario", "is required".to_string());
                None
            }
            Some(t) => match self.parse_time(t) {
                Some(time) => Some(time),
                None => {
                    fail("horario", format!("invalid time '{t}'; expected HH:MM (24h)"));
                    None
                }
            },
        };

        let leader_email = match record.get("lider_email") {
            None => {
                fail("lider_email", "is required".to_string());
                None
            }
            Some(e) if e.chars().count() > MAX_TEXT_LEN => {
                fail(
                    "lider_email",
                    format!("must be at most {MAX_TEXT_LEN} characters"),
                );
                None
            }
            Some(e) if !self.email.is_match(e) => {
                fail("lider_email", format!("invalid email '{e}'"));
                None
            }
            Some(e) => Some(e.to_string()),
        };

        let leader_phone = match record.get("lider_telefone") {
            None => Some(None),
            Some(p) => match check_phone(p) {
                Ok(()) => Some(Some(p.to_string())),
                Err(message) => {
                    fail("lider_telefone", message);
                    None
                }
            },
        };

        let password = record.get("senha").map(|s| secret_string(s.to_string()));

        match (
            generation,
            generation_color,
            cell,
            weekday,
            time,
            address,
            target_audience,
            leader_name,
            leader_email,
            leader_phone,
        ) {
            (
                Some(generation),
                Some(generation_color),
                Some(cell),
                Some(weekday),
                Some(time),
                Some(address),
                Some(target_audience),
                Some(leader_name),
                Some(leader_email),
                Some(leader_phone),
            ) if errors.is_empty() => Ok(ImportRow {
                index: row,
                generation,
                generation_color,
                cell,
                weekday,
                time,
                address,
                target_audience,
                leader_name,
                leader_email,
                leader_phone,
                password,
            }),
            _ => Err(errors),
        }
    }

    fn parse_time(&self, value: &str) -> Option<NaiveTime> {
        if !self.time.is_match(value) {
            return None;
        }
        NaiveTime::parse_from_str(value, "%H:%M").ok()
    }
}

fn required_text(
    record: &RawRecord,
    field: &str,
    max: usize,
    fail: &mut impl FnMut(&str, String),
) -> Option<String> {
    match record.get(field) {
        None => {
            fail(field, "is required".to_string());
            None
        }
        Some(v) if v.chars().count() > max => {
            fail(field, format!("must be at most {max} characters"));
            None
        }
        Some(v) => Some(v.to_string()),
    }
}

/// `Some(None)` for a blank optional field, `None` when the value is rejected
fn optional_text(
    record: &RawRecord,
    field: &str,
    max: usize,
    fail: &mut impl FnMut(&str, String),
) -> Option<Option<String>> {
    match record.get(field) {
        None => Some(None),
        Some(v) if v.chars().count() > max => {
            fail(field, format!("must be at most {max} characters"));
            None
        }
        Some(v) => Some(Some(v.to_string())),
    }
}

fn check_phone(phone: &str) -> Result<(), String> {
    if let Some(bad) = phone
        .chars()
        .find(|c| !(c.is_ascii_digit() || matches!(c, ' ' | '(' | ')' | '+' | '-')))
    {
        return Err(format!("invalid character '{bad}' in phone number"));
    }
    let digits = phone.chars().filter(|c| c.is_ascii_digit()).count();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(format!(
            "phone number must have between {MIN_PHONE_DIGITS} and {MAX_PHONE_DIGITS} digits"
        ));
    }
    Ok(())
}
