//! Declarative request validation.
//!
//! Each request type lists its fields together with a static rule table and
//! runs them through a [`Validator`]. Every failing rule of every field is
//! reported; the input is never modified.

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::Patch;
use crate::errors::AppError;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// A constraint attached to a request field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Rule {
    /// Value must not be empty (empty string, empty list, absent, zero).
    Required,
    /// If the value is empty, every other rule for the field is skipped.
    OmitEmpty,
    /// Minimum string length in characters, or minimum list length.
    Min(usize),
    /// Maximum string length in characters, or maximum list length.
    Max(usize),
    /// String must equal one of the options.
    OneOf(&'static [&'static str]),
    /// Numeric lower bound (inclusive).
    Gte(i64),
    /// Numeric upper bound (inclusive).
    Lte(i64),
    /// String must contain both "@" and ".".
    Email,
    /// String must be a calendar date (`YYYY-MM-DD` or an RFC 3339 timestamp).
    Date,
}

/// A borrowed view of a field value, as seen by the rules.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldValue<'a> {
    Str(&'a str),
    List(usize),
    Int(i64),
    Float(f64),
    Absent,
}

impl FieldValue<'_> {
    /// The "empty" value for each kind of field.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Str(s) => s.is_empty(),
            FieldValue::List(len) => *len == 0,
            FieldValue::Int(n) => *n == 0,
            FieldValue::Float(n) => *n == 0.0,
            FieldValue::Absent => true,
        }
    }
}

impl<'a> From<&'a String> for FieldValue<'a> {
    fn from(value: &'a String) -> Self {
        FieldValue::Str(value)
    }
}

impl<'a> From<&'a str> for FieldValue<'a> {
    fn from(value: &'a str) -> Self {
        FieldValue::Str(value)
    }
}

impl<'a, T> From<&'a Vec<T>> for FieldValue<'a> {
    fn from(value: &'a Vec<T>) -> Self {
        FieldValue::List(value.len())
    }
}

impl<'a> From<&'a i64> for FieldValue<'a> {
    fn from(value: &'a i64) -> Self {
        FieldValue::Int(*value)
    }
}

impl<'a> From<&'a f64> for FieldValue<'a> {
    fn from(value: &'a f64) -> Self {
        FieldValue::Float(*value)
    }
}

impl<'a, T> From<&'a Option<T>> for FieldValue<'a>
where
    &'a T: Into<FieldValue<'a>>,
{
    fn from(value: &'a Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => FieldValue::Absent,
        }
    }
}

impl<'a, T> From<&'a Patch<T>> for FieldValue<'a>
where
    &'a T: Into<FieldValue<'a>>,
{
    fn from(value: &'a Patch<T>) -> Self {
        match value.as_option() {
            Some(inner) => inner.into(),
            None => FieldValue::Absent,
        }
    }
}

/// Implemented by every request type that carries field rules.
pub trait Validate {
    fn validate(&self) -> Vec<FieldViolation>;

    /// Run the rules and turn any violation into [`AppError::Validation`].
    fn validated(&self) -> Result<(), AppError> {
        let violations = self.validate();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(violations))
        }
    }
}

/// Collects violations across the fields of one request.
#[derive(Debug, Default)]
pub struct Validator {
    violations: Vec<FieldViolation>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check one field against its rule table.
    pub fn field<'a>(
        mut self,
        name: &str,
        value: impl Into<FieldValue<'a>>,
        rules: &[Rule],
    ) -> Self {
        self.violations.extend(check_field(name, value.into(), rules));
        self
    }

    /// Merge the violations of a nested item, prefixing their field names.
    pub fn nested(mut self, prefix: &str, inner: Vec<FieldViolation>) -> Self {
        self.violations
            .extend(inner.into_iter().map(|v| FieldViolation {
                field: format!("{}.{}", prefix, v.field),
                message: format!("{}.{}", prefix, v.message),
            }));
        self
    }

    pub fn finish(self) -> Vec<FieldViolation> {
        self.violations
    }
}

/// Evaluate `rules` against a single value.
///
/// A failed `required` on an empty value is reported once; the remaining
/// rules would only restate it.
pub fn check_field(name: &str, value: FieldValue<'_>, rules: &[Rule]) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if value.is_empty() {
        if rules.contains(&Rule::OmitEmpty) {
            return violations;
        }
        if rules.contains(&Rule::Required) {
            violations.push(violation(name, format!("{} is required", name)));
            return violations;
        }
    }

    for rule in rules {
        let failure = match (*rule, value) {
            (Rule::Min(min), FieldValue::Str(s)) if s.chars().count() < min => {
                Some(format!("{} must be at least {} characters", name, min))
            }
            (Rule::Min(min), FieldValue::List(len)) if len < min => {
                Some(format!("{} must have at least {} items", name, min))
            }
            (Rule::Max(max), FieldValue::Str(s)) if s.chars().count() > max => {
                Some(format!("{} must be at most {} characters", name, max))
            }
            (Rule::Max(max), FieldValue::List(len)) if len > max => {
                Some(format!("{} must have at most {} items", name, max))
            }
            (Rule::OneOf(options), FieldValue::Str(s)) if !options.iter().any(|o| *o == s) => {
                Some(format!("{} must be one of: {}", name, options.join(", ")))
            }
            (Rule::Gte(min), FieldValue::Int(n)) if n < min => Some(gte_message(name, min)),
            (Rule::Gte(min), FieldValue::Float(n)) if n < min as f64 => {
                Some(gte_message(name, min))
            }
            (Rule::Lte(max), FieldValue::Int(n)) if n > max => Some(lte_message(name, max)),
            (Rule::Lte(max), FieldValue::Float(n)) if n > max as f64 => {
                Some(lte_message(name, max))
            }
            (Rule::Email, FieldValue::Str(s)) if !is_valid_email(s) => {
                Some(format!("{} must be a valid email", name))
            }
            (Rule::Date, FieldValue::Str(s)) if normalize_date(s).is_none() => {
                Some(format!("{} must be a valid date (YYYY-MM-DD)", name))
            }
            _ => None,
        };

        if let Some(message) = failure {
            violations.push(violation(name, message));
        }
    }

    violations
}

/// Deliberately weak: anything with an "@" and a "." passes.
pub fn is_valid_email(email: &str) -> bool {
    email.contains('@') && email.contains('.')
}

/// Normalise a date or RFC 3339 timestamp to `YYYY-MM-DD`.
pub fn normalize_date(value: &str) -> Option<String> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}

fn gte_message(name: &str, min: i64) -> String {
    format!("{} must be greater than or equal to {}", name, min)
}

fn lte_message(name: &str, max: i64) -> String {
    format!("{} must be less than or equal to {}", name, max)
}

fn violation(field: &str, message: String) -> FieldViolation {
    FieldViolation {
        field: field.to_string(),
        message,
    }
}
