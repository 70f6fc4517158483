//! Field-level validation rules for request bodies.
//!
//! Record types declare their rules in [`Record::check`](crate::record::Record::check)
//! using these helpers; the body binder runs them before a handler sees the value.

use regex::Regex;
use serde::Serialize;

/// One field-level validation error. Serialized into the `details` payload of
/// a 422 response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldViolation {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Require a value to be present (non-null).
pub fn required(out: &mut Vec<FieldViolation>, field: &str, present: bool) {
    if !present {
        out.push(FieldViolation::new(field, format!("{} is required", field)));
    }
}

/// Maximum string length, in bytes. Absent values pass.
pub fn max_length(out: &mut Vec<FieldViolation>, field: &str, value: Option<&str>, max: usize) {
    if let Some(s) = value {
        if s.len() > max {
            out.push(FieldViolation::new(
                field,
                format!("{} must be at most {} characters", field, max),
            ));
        }
    }
}

/// Minimum string length, in bytes. Absent values pass.
pub fn min_length(out: &mut Vec<FieldViolation>, field: &str, value: Option<&str>, min: usize) {
    if let Some(s) = value {
        if s.len() < min {
            out.push(FieldViolation::new(
                field,
                format!("{} must be at least {} characters", field, min),
            ));
        }
    }
}

/// Regex pattern match. An unparsable pattern is reported as a violation
/// rather than a panic; patterns come from record declarations.
pub fn pattern(out: &mut Vec<FieldViolation>, field: &str, value: Option<&str>, pattern: &str) {
    let Some(s) = value else { return };
    match Regex::new(pattern) {
        Ok(re) => {
            if !re.is_match(s) {
                out.push(FieldViolation::new(
                    field,
                    format!("{} does not match required pattern", field),
                ));
            }
        }
        Err(_) => out.push(FieldViolation::new(
            field,
            format!("invalid pattern for {}", field),
        )),
    }
}
