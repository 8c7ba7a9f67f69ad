//! Strict conversions from untyped JSON values to typed field values.
//!
//! # Design
//! Every resource field goes through exactly one of these functions. Each
//! takes the field name (for diagnostics) and the raw value as it was found in
//! the decoded object: `None` when the key is absent. A JSON `null` counts as
//! absent.
//!
//! - `man_*` functions fail when the value is absent or has the wrong type.
//! - `opt_*` functions return the supplied default when the value is absent,
//!   and otherwise apply the same strict conversion as their `man_*` twin.
//!
//! This module is the only place where a default replaces a missing value.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset};
use serde_json::Value;
use thiserror::Error;

/// Wire format of every timestamp the service sends, e.g.
/// `2024-05-01T10:00:00+02:00`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// A field value that could not be converted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CastError {
    #[error("field `{field}` is missing")]
    Missing { field: String },

    #[error("field `{field}`: expected {expected}, found {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: String,
    },

    #[error("field `{field}`: {value:?} is not a valid {expected}")]
    Format {
        field: String,
        expected: &'static str,
        value: String,
    },
}

impl CastError {
    pub fn field(&self) -> &str {
        match self {
            CastError::Missing { field }
            | CastError::WrongType { field, .. }
            | CastError::Format { field, .. } => field,
        }
    }
}

/// An exact decimal number kept in its textual form.
///
/// Two decimals compare equal when they denote the same number, so `"1.50"`
/// equals `"1.5"` while both keep their original text.
#[derive(Debug, Clone, Default, Eq)]
pub struct Decimal(String);

impl Decimal {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Sign, integer digits and fraction digits with redundant zeros removed.
    fn normalized(&self) -> (bool, &str, &str) {
        let (negative, digits) = match self.0.as_bytes().first() {
            Some(b'-') => (true, &self.0[1..]),
            Some(b'+') => (false, &self.0[1..]),
            _ => (false, self.0.as_str()),
        };
        let (int, frac) = digits.split_once('.').unwrap_or((digits, ""));
        let int = int.trim_start_matches('0');
        let frac = frac.trim_end_matches('0');
        let zero = int.is_empty() && frac.is_empty();
        (negative && !zero, int, frac)
    }
}

impl FromStr for Decimal {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix(&['-', '+'][..]).unwrap_or(s);
        let (int, frac) = match digits.split_once('.') {
            Some((int, frac)) => (int, Some(frac)),
            None => (digits, None),
        };
        let all_digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(int) || frac.is_some_and(|frac| !all_digits(frac)) {
            return Err(());
        }
        Ok(Decimal(s.to_string()))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.normalized() == other.normalized()
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|value| !value.is_null())
}

fn required<'a>(field: &str, value: Option<&'a Value>) -> Result<&'a Value, CastError> {
    present(value).ok_or_else(|| CastError::Missing {
        field: field.to_string(),
    })
}

fn wrong_type(field: &str, expected: &'static str, found: &Value) -> CastError {
    CastError::WrongType {
        field: field.to_string(),
        expected,
        found: found.to_string(),
    }
}

fn bad_format(field: &str, expected: &'static str, value: &str) -> CastError {
    CastError::Format {
        field: field.to_string(),
        expected,
        value: value.to_string(),
    }
}

fn to_string(field: &str, value: &Value) -> Result<String, CastError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| wrong_type(field, "a string", value))
}

fn to_int(field: &str, value: &Value) -> Result<i64, CastError> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| wrong_type(field, "an integer", value)),
        Value::String(text) => text
            .parse()
            .map_err(|_| bad_format(field, "integer", text)),
        _ => Err(wrong_type(field, "an integer", value)),
    }
}

fn to_bool(field: &str, value: &Value) -> Result<bool, CastError> {
    value
        .as_bool()
        .ok_or_else(|| wrong_type(field, "a boolean", value))
}

fn to_decimal(field: &str, value: &Value) -> Result<Decimal, CastError> {
    let text = match value {
        Value::Number(number) => number.to_string(),
        Value::String(text) => text.clone(),
        _ => return Err(wrong_type(field, "a decimal", value)),
    };
    text.parse().map_err(|()| bad_format(field, "decimal", &text))
}

fn to_datetime(field: &str, value: &Value) -> Result<DateTime<FixedOffset>, CastError> {
    let text = value
        .as_str()
        .ok_or_else(|| wrong_type(field, "a timestamp string", value))?;
    DateTime::parse_from_str(text, DATETIME_FORMAT).map_err(|_| bad_format(field, "timestamp", text))
}

pub fn man_string(field: &str, value: Option<&Value>) -> Result<String, CastError> {
    to_string(field, required(field, value)?)
}

pub fn opt_string(
    field: &str,
    value: Option<&Value>,
    default: Option<String>,
) -> Result<Option<String>, CastError> {
    present(value).map_or(Ok(default), |value| to_string(field, value).map(Some))
}

pub fn man_int(field: &str, value: Option<&Value>) -> Result<i64, CastError> {
    to_int(field, required(field, value)?)
}

pub fn opt_int(
    field: &str,
    value: Option<&Value>,
    default: Option<i64>,
) -> Result<Option<i64>, CastError> {
    present(value).map_or(Ok(default), |value| to_int(field, value).map(Some))
}

pub fn man_bool(field: &str, value: Option<&Value>) -> Result<bool, CastError> {
    to_bool(field, required(field, value)?)
}

pub fn opt_bool(
    field: &str,
    value: Option<&Value>,
    default: Option<bool>,
) -> Result<Option<bool>, CastError> {
    present(value).map_or(Ok(default), |value| to_bool(field, value).map(Some))
}

pub fn man_decimal(field: &str, value: Option<&Value>) -> Result<Decimal, CastError> {
    to_decimal(field, required(field, value)?)
}

pub fn opt_decimal(
    field: &str,
    value: Option<&Value>,
    default: Option<Decimal>,
) -> Result<Option<Decimal>, CastError> {
    present(value).map_or(Ok(default), |value| to_decimal(field, value).map(Some))
}

pub fn man_datetime(field: &str, value: Option<&Value>) -> Result<DateTime<FixedOffset>, CastError> {
    to_datetime(field, required(field, value)?)
}

pub fn opt_datetime(
    field: &str,
    value: Option<&Value>,
    default: Option<DateTime<FixedOffset>>,
) -> Result<Option<DateTime<FixedOffset>>, CastError> {
    present(value).map_or(Ok(default), |value| to_datetime(field, value).map(Some))
}
