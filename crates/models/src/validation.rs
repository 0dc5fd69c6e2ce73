//! Structural validation of incoming payloads.
//!
//! Every payload is checked field by field and all problems are reported at
//! once, so a client can highlight each offending form field. Nothing here
//! touches storage.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;
use uuid::Uuid;

/// A problem with a single input field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field problems found in one payload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[error("invalid input: {}", summarize(.errors))]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            errors: vec![FieldError {
                field: field.into(),
                message: message.into(),
            }],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// The first offending field, if any
    pub fn first_field(&self) -> Option<&str> {
        self.errors.first().map(|e| e.field.as_str())
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

/// A number as submitted by a form: either a JSON number or its text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(untagged)]
pub enum RawNumber {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl RawNumber {
    /// Coerces the value into a whole number, rejecting fractions and garbage
    pub fn coerce(&self) -> Option<i64> {
        match self {
            Self::Integer(n) => Some(*n),
            Self::Float(f) => float_to_whole(*f),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_to_whole))
            }
        }
    }
}

fn float_to_whole(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= i64::MAX as f64).then_some(f as i64)
}

impl From<i64> for RawNumber {
    fn from(n: i64) -> Self {
        Self::Integer(n)
    }
}

/// Collects field errors while individual fields are normalised
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_errors(self) -> ValidationErrors {
        ValidationErrors {
            errors: self.errors,
        }
    }

    /// Required text, trimmed, with a length bound in characters
    pub fn text(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&str>,
        length: RangeInclusive<usize>,
    ) -> Option<String> {
        match value.map(str::trim) {
            None | Some("") => {
                self.push(field, format!("{label} is required."));
                None
            }
            Some(text) => self.bounded_text(field, label, text, length),
        }
    }

    /// Text that may be left out, but is length-checked when present
    pub fn optional_text(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&str>,
        length: RangeInclusive<usize>,
    ) -> Option<String> {
        match value.map(str::trim) {
            None | Some("") => None,
            Some(text) => self.bounded_text(field, label, text, length),
        }
    }

    fn bounded_text(
        &mut self,
        field: &str,
        label: &str,
        text: &str,
        length: RangeInclusive<usize>,
    ) -> Option<String> {
        let count = text.chars().count();

        if count < *length.start() {
            self.push(
                field,
                format!("{label} must be at least {} characters long.", length.start()),
            );
            None
        } else if count > *length.end() {
            self.push(
                field,
                format!("{label} must be at most {} characters long.", length.end()),
            );
            None
        } else {
            Some(text.to_string())
        }
    }

    /// Required whole number within `range`
    pub fn number(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&RawNumber>,
        range: RangeInclusive<i64>,
    ) -> Option<i64> {
        match value {
            None => {
                self.push(field, format!("{label} is required."));
                None
            }
            Some(raw) => self.bounded_number(field, label, raw, range),
        }
    }

    /// Whole number that may be left out, but is range-checked when present
    pub fn optional_number(
        &mut self,
        field: &str,
        label: &str,
        value: Option<&RawNumber>,
        range: RangeInclusive<i64>,
    ) -> Option<i64> {
        value.and_then(|raw| self.bounded_number(field, label, raw, range))
    }

    fn bounded_number(
        &mut self,
        field: &str,
        label: &str,
        raw: &RawNumber,
        range: RangeInclusive<i64>,
    ) -> Option<i64> {
        let Some(n) = raw.coerce() else {
            self.push(field, format!("{label} must be a whole number."));
            return None;
        };

        if range.contains(&n) {
            Some(n)
        } else {
            self.push(
                field,
                format!(
                    "{label} must be between {} and {}.",
                    range.start(),
                    range.end()
                ),
            );
            None
        }
    }

    /// Required reference to another record
    pub fn id(&mut self, field: &str, label: &str, value: Option<&str>) -> Option<Uuid> {
        match value.map(str::trim) {
            None | Some("") => {
                self.push(field, format!("{label} is required."));
                None
            }
            Some(text) => self.parse_id(field, label, text),
        }
    }

    /// Reference that may be left out. A malformed value is recorded as an
    /// error and also yields `None`.
    pub fn optional_id(&mut self, field: &str, label: &str, value: Option<&str>) -> Option<Uuid> {
        match value.map(str::trim) {
            None | Some("") => None,
            Some(text) => self.parse_id(field, label, text),
        }
    }

    fn parse_id(&mut self, field: &str, label: &str, text: &str) -> Option<Uuid> {
        match Uuid::parse_str(text) {
            Ok(id) => Some(id),
            Err(_) => {
                self.push(field, format!("{label} must be a valid identifier."));
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_number_coercion() {
        assert_eq!(RawNumber::Integer(7).coerce(), Some(7));
        assert_eq!(RawNumber::Float(7.0).coerce(), Some(7));
        assert_eq!(RawNumber::Float(7.5).coerce(), None);
        assert_eq!(RawNumber::Text(" 12 ".into()).coerce(), Some(12));
        assert_eq!(RawNumber::Text("12.0".into()).coerce(), Some(12));
        assert_eq!(RawNumber::Text("twelve".into()).coerce(), None);
    }

    #[test]
    fn test_raw_number_deserializes_numbers_and_text() {
        let n: RawNumber = serde_json::from_str("25").unwrap();
        assert_eq!(n.coerce(), Some(25));

        let n: RawNumber = serde_json::from_str("\"25\"").unwrap();
        assert_eq!(n.coerce(), Some(25));
    }

    #[test]
    fn test_text_bounds() {
        let mut v = Validator::new();
        assert_eq!(v.text("name", "Name", Some("  Jan "), 3..=15), Some("Jan".into()));
        assert!(v.is_valid());

        assert_eq!(v.text("name", "Name", Some("Al"), 3..=15), None);
        assert_eq!(v.text("surname", "Surname", None, 3..=40), None);
        assert_eq!(v.text("nick", "Nick", Some("   "), 3..=40), None);

        let errors = v.into_errors();
        assert_eq!(errors.errors.len(), 3);
        assert!(errors.contains("name"));
        assert!(errors.contains("surname"));
        assert_eq!(errors.first_field(), Some("name"));
    }

    #[test]
    fn test_text_length_counts_characters() {
        let mut v = Validator::new();
        // 3 characters, 6 bytes
        assert_eq!(v.text("name", "Name", Some("Łęż"), 3..=3), Some("Łęż".into()));
        assert!(v.is_valid());
    }

    #[test]
    fn test_number_bounds() {
        let mut v = Validator::new();
        assert_eq!(v.number("capacity", "Capacity", Some(&RawNumber::Integer(100)), 1..=100), Some(100));
        assert_eq!(v.number("capacity", "Capacity", Some(&RawNumber::Integer(101)), 1..=100), None);
        assert_eq!(v.number("capacity", "Capacity", Some(&RawNumber::Text("x".into())), 1..=100), None);
        assert_eq!(v.number("capacity", "Capacity", None, 1..=100), None);
        assert_eq!(v.optional_number("extra", "Extra", None, 1..=100), None);
        assert_eq!(v.into_errors().errors.len(), 3);
    }

    #[test]
    fn test_ids() {
        let mut v = Validator::new();
        let id = Uuid::new_v4();
        assert_eq!(v.id("roomId", "Room", Some(&id.to_string())), Some(id));
        assert_eq!(v.optional_id("groupId", "Group", Some("")), None);
        assert!(v.is_valid());

        assert_eq!(v.id("roomId", "Room", Some("not-a-uuid")), None);
        assert_eq!(v.optional_id("groupId", "Group", Some("nope")), None);
        assert_eq!(v.into_errors().errors.len(), 2);
    }

    #[test]
    fn test_errors_display_lists_fields() {
        let errors = ValidationErrors::single("name", "Name is required.");
        assert_eq!(errors.to_string(), "invalid input: name: Name is required.");
    }
}
