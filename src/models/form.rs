//! Form binding helpers shared by the catalog forms

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;
use validator::ValidationErrors;

pub const REQUIRED: &str = "This field is required.";
pub const INVALID_DATE: &str = "Enter a valid date.";
pub const INVALID_CHOICE: &str = "Select a valid choice.";

/// Accepted input formats for date fields
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Field-level validation messages, keyed by field name
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn merge(&mut self, other: FieldErrors) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }

    /// `Ok(value)` when no error was recorded
    pub fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(&field.to_string(), message);
            }
        }
        out
    }
}

/// A submitted form that can be turned into typed, validated data
pub trait BoundForm {
    type Valid;

    fn validate(&self) -> Result<Self::Valid, FieldErrors>;
}

/// Parse a date input in any of the accepted formats
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

/// Optional date field: blank is `None`, anything else must parse
pub fn optional_date(field: &str, value: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    if value.trim().is_empty() {
        return None;
    }
    let parsed = parse_date(value);
    if parsed.is_none() {
        errors.add(field, INVALID_DATE);
    }
    parsed
}

/// Required date field
pub fn required_date(field: &str, value: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    if value.trim().is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    optional_date(field, value, errors)
}

/// Required choice field holding a primary key
pub fn required_choice(field: &str, value: &str, errors: &mut FieldErrors) -> Option<i32> {
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, REQUIRED);
        return None;
    }
    let parsed = value.parse::<i32>().ok();
    if parsed.is_none() {
        errors.add(field, INVALID_CHOICE);
    }
    parsed
}
