//! Field-level validation shared by the request payloads.
//!
//! Each check records a message under the offending field name and returns
//! the cleaned value when it passes, so a payload can be walked in one pass
//! and report every bad field at once.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::types::{PrepTime, Price, PriceError};

pub const NAME_MAX_LEN: usize = 255;
pub const DESCRIPTION_MAX_LEN: usize = 500;

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";
pub const NULL: &str = "This field may not be null.";
pub const NOT_A_STRING: &str = "Not a valid string.";
pub const NOT_A_BOOLEAN: &str = "Must be a valid boolean.";

/// Offending fields mapped to a client-facing message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// First message recorded for a field wins
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Hand back `value` when nothing was recorded
    pub fn finish<T>(self, value: impl FnOnce() -> T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

fn too_long(max: usize) -> String {
    format!("Ensure this field has no more than {} characters.", max)
}

/// Unwrap a JSON string, recording null or any other type as an error
fn string_value(errors: &mut FieldErrors, field: &str, value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Null => {
            errors.add(field, NULL);
            None
        }
        _ => {
            errors.add(field, NOT_A_STRING);
            None
        }
    }
}

/// Required, trimmed, non-blank text bounded by `max` characters
pub fn required_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Value>,
    max: usize,
) -> Option<String> {
    let Some(value) = value else {
        errors.add(field, REQUIRED);
        return None;
    };
    let value = string_value(errors, field, value)?;
    let value = value.trim();
    if value.is_empty() {
        errors.add(field, BLANK);
        return None;
    }
    if value.chars().count() > max {
        errors.add(field, too_long(max));
        return None;
    }
    Some(value.to_string())
}

/// Optional text; absent values become blank
pub fn optional_text(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<Value>,
    max: usize,
) -> Option<String> {
    let value = match value {
        Some(value) => string_value(errors, field, value)?,
        None => String::new(),
    };
    let value = value.trim();
    if value.chars().count() > max {
        errors.add(field, too_long(max));
        return None;
    }
    Some(value.to_string())
}

/// Decimal price given either as a JSON string or a JSON number
pub fn price(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Option<Price> {
    let parsed = match value {
        None => {
            errors.add(field, REQUIRED);
            return None;
        }
        Some(Value::Null) => {
            errors.add(field, NULL);
            return None;
        }
        Some(Value::String(s)) => s.parse::<Price>(),
        Some(Value::Number(n)) => n.to_string().parse::<Price>(),
        Some(_) => Err(PriceError::Invalid),
    };

    parsed
        .map_err(|e| errors.add(field, e.to_string()))
        .ok()
}

/// Duration given as clock text, or as a bare number of seconds
pub fn duration(errors: &mut FieldErrors, field: &str, value: Option<Value>) -> Option<PrepTime> {
    let text = match value {
        None => {
            errors.add(field, REQUIRED);
            return None;
        }
        Some(Value::Null) => {
            errors.add(field, NULL);
            return None;
        }
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => String::new(),
    };
    text.parse::<PrepTime>()
        .map_err(|e| errors.add(field, e.to_string()))
        .ok()
}

/// Boolean given as JSON `true`/`false`, `0`/`1`, or one of the usual
/// spellings (`"yes"`, `"off"`, ...)
pub fn boolean(errors: &mut FieldErrors, field: &str, value: Value) -> Option<bool> {
    let parsed = match &value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.as_str() {
            "true" | "True" | "TRUE" | "yes" | "Yes" | "YES" | "y" | "Y" | "on" | "On" | "ON"
            | "1" => Some(true),
            "false" | "False" | "FALSE" | "no" | "No" | "NO" | "n" | "N" | "off" | "Off"
            | "OFF" | "0" => Some(false),
            _ => None,
        },
        Value::Null => {
            errors.add(field, NULL);
            return None;
        }
        _ => None,
    };

    if parsed.is_none() {
        errors.add(field, NOT_A_BOOLEAN);
    }
    parsed
}
