//! Value coercion: the single place a field accepts or rejects input

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use super::date;
use super::field::{FieldDef, FieldKind};
use super::value::Value;
use super::RecordError;

/// Convert `value` into the stored form for `field`, or reject it
pub(crate) fn coerce(field: &FieldDef, value: Value) -> Result<Value, RecordError> {
    if value.is_null() {
        return Ok(empty_value(field));
    }

    match field.kind {
        FieldKind::Bounded { max_len } => {
            let text = text_of(field, value)?.trim().to_string();
            let length = text.len();
            if length > max_len {
                return Err(RecordError::LengthExceeded {
                    field: field.name.to_string(),
                    value: text,
                    length,
                    max: max_len,
                });
            }
            Ok(Value::Text(text))
        }
        FieldKind::Trimmed => Ok(Value::Text(text_of(field, value)?.trim().to_string())),
        FieldKind::Text => Ok(Value::Text(text_of(field, value)?)),
        FieldKind::Unsigned => match int_of(field, value)? {
            None => Ok(empty_value(field)),
            Some(i) => check_range(field, i, 0, i64::MAX),
        },
        FieldKind::Signed => match int_of(field, value)? {
            None => Ok(empty_value(field)),
            Some(i) => Ok(Value::Int(i)),
        },
        FieldKind::Ranged { min, max } => match int_of(field, value)? {
            None => Ok(empty_value(field)),
            Some(i) => check_range(field, i, min, max),
        },
        FieldKind::Boolean => bool_of(field, value),
        FieldKind::Date => match date_time_of(field, value)? {
            None => Ok(empty_value(field)),
            Some(dt) => Ok(Value::Date(dt.date())),
        },
        FieldKind::DateTime => match date_time_of(field, value)? {
            None => Ok(empty_value(field)),
            Some(dt) => Ok(Value::DateTime(dt)),
        },
        FieldKind::Keywords => {
            let entries = match value {
                Value::List(items) => items,
                other => vec![text_of(field, other)?],
            };
            Ok(Value::List(entries.iter().flat_map(|e| split_keywords(e)).collect()))
        }
    }
}

/// Split comma-separated keyword text into entries, trimming control
/// characters and spaces. Empty entries vanish.
pub(crate) fn split_keywords(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(',')
        .map(|part| part.trim_matches(|c: char| c <= ' '))
        .filter(|part| !part.is_empty())
        .map(str::to_string)
}

fn empty_value(field: &FieldDef) -> Value {
    if field.nullable {
        Value::Null
    } else {
        field.kind.zero_value()
    }
}

fn mismatch(field: &FieldDef, value: &Value) -> RecordError {
    RecordError::TypeMismatch {
        field: field.name.to_string(),
        value: value.describe(),
        expected: field.kind.type_name(),
        hint: field.description,
    }
}

fn check_range(field: &FieldDef, value: i64, min: i64, max: i64) -> Result<Value, RecordError> {
    if value < min || value > max {
        return Err(RecordError::RangeError {
            field: field.name.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(Value::Int(value))
}

fn text_of(field: &FieldDef, value: Value) -> Result<String, RecordError> {
    match value {
        Value::Text(s) => Ok(s),
        Value::Int(i) => Ok(i.to_string()),
        Value::Date(d) => Ok(date::display_date(&d)),
        Value::DateTime(dt) => Ok(date::display_date_time(&dt)),
        Value::List(items) => Ok(items.join(", ")),
        other => Err(mismatch(field, &other)),
    }
}

/// `None` means blank input
fn int_of(field: &FieldDef, value: Value) -> Result<Option<i64>, RecordError> {
    match value {
        Value::Int(i) => Ok(Some(i)),
        Value::Bool(b) => Ok(Some(i64::from(b))),
        Value::Text(ref s) if s.trim().is_empty() => Ok(None),
        Value::Text(ref s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| mismatch(field, &value)),
        other => Err(mismatch(field, &other)),
    }
}

fn bool_of(field: &FieldDef, value: Value) -> Result<Value, RecordError> {
    match value {
        Value::Bool(b) => Ok(Value::Bool(b)),
        Value::Int(i) => Ok(Value::Bool(i != 0)),
        Value::Text(ref s) => match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" | "y" => Ok(Value::Bool(true)),
            "0" | "false" | "no" | "off" | "n" => Ok(Value::Bool(false)),
            "" => Ok(empty_value(field)),
            _ => Err(mismatch(field, &value)),
        },
        other => Err(mismatch(field, &other)),
    }
}

/// `None` means blank input
fn date_time_of(field: &FieldDef, value: Value) -> Result<Option<NaiveDateTime>, RecordError> {
    match value {
        Value::DateTime(dt) => Ok(Some(dt)),
        Value::Date(d) => Ok(Some(midnight(d))),
        Value::Int(seconds) => date::from_timestamp(seconds)
            .map(Some)
            .ok_or_else(|| mismatch(field, &value)),
        Value::Text(ref s) if s.trim().is_empty() => Ok(None),
        Value::Text(ref s) => date::parse_date_time(s)
            .map(Some)
            .ok_or_else(|| mismatch(field, &value)),
        other => Err(mismatch(field, &other)),
    }
}

fn midnight(d: NaiveDate) -> NaiveDateTime {
    d.and_time(NaiveTime::MIN)
}
