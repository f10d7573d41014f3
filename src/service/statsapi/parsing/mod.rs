use core::fmt;

use chrono::{DateTime, Utc};
use json::JsonValue;

use crate::model::choice::Choice;

pub mod item;
pub mod skill;
pub mod user;

#[derive(Debug, Clone, PartialEq)]
pub enum ParsingError {
    InvalidType(String),
    UnknownVariant(String, String),
    InvalidTimestamp(String, String),
}

impl fmt::Display for ParsingError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ParsingError::InvalidType(field) => write!(f, "Invalid type for field: {}", field),
            ParsingError::UnknownVariant(field, value) => write!(f, "Unknown value '{}' for field: {}", value, field),
            ParsingError::InvalidTimestamp(field, value) => {
                write!(f, "Invalid timestamp '{}' for field: {}", value, field)
            }
        }
    }
}

pub(crate) fn parse_choice<T: Choice>(json: &JsonValue, field: &str) -> Result<T, ParsingError> {
    let code = json.as_str().ok_or(ParsingError::InvalidType(field.into()))?;
    T::from_code(code).ok_or(ParsingError::UnknownVariant(field.into(), code.into()))
}

/// Absent or null timestamps are `None`, anything else has to be RFC 3339
pub(crate) fn parse_timestamp(json: &JsonValue, field: &str) -> Result<Option<DateTime<Utc>>, ParsingError> {
    if json.is_null() {
        return Ok(None);
    }
    let raw = json.as_str().ok_or(ParsingError::InvalidType(field.into()))?;
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .map_err(|_| ParsingError::InvalidTimestamp(field.into(), raw.into()))
}

/// Aggregated counters may arrive as floats (`SUM` over a decimal column) or be null for unused entries
pub(crate) fn parse_counter(json: &JsonValue) -> Option<u64> {
    json.as_u64().or_else(|| {
        json.as_f64()
            .filter(|v| v.is_finite() && *v >= 0.0)
            .map(|v| v.round() as u64)
    })
}

/// List endpoints answer either with a bare array or with a paginated `{"results": [...]}` envelope
pub(crate) fn list_entries<'a>(json: &'a JsonValue, field: &str) -> Result<&'a [JsonValue], ParsingError> {
    match json {
        JsonValue::Array(array) => Ok(array),
        JsonValue::Object(obj) => match &obj["results"] {
            JsonValue::Array(array) => Ok(array),
            _ => Err(ParsingError::InvalidType(format!("{}.results", field))),
        },
        _ => Err(ParsingError::InvalidType(field.into())),
    }
}
