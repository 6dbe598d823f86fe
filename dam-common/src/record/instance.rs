//! Record instances
//!
//! A [`Record`] holds one value per schema field. Every write goes through
//! [`Record::set`] (or construction, which uses the same coercion), so a
//! stored value always satisfies its field's constraints. A rejected write
//! leaves the previous value in place.

use chrono::{NaiveDateTime, NaiveTime};
use serde::ser::{Serialize, Serializer};

use super::coerce::{coerce, split_keywords};
use super::date;
use super::field::{FieldDef, FieldKind};
use super::schema::Schema;
use super::value::{FieldMap, Value};
use super::RecordError;
use crate::escape::escape_shell_arg;

#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    schema: &'static Schema,
    values: Vec<Value>,
}

impl Record {
    /// Record with every field at its default
    pub fn new(schema: &'static Schema) -> Result<Self, RecordError> {
        Self::construct(schema, FieldMap::new())
    }

    /// Build a record from a key/value mapping
    ///
    /// Keys resolve through field names and schema aliases; unknown keys are
    /// ignored. Missing fields take their default.
    pub fn construct<I, K, V>(schema: &'static Schema, input: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut supplied: Vec<Option<Value>> = vec![None; schema.fields.len()];
        for (key, value) in input {
            if let Some(index) = schema.resolve(key.as_ref()) {
                supplied[index] = Some(value.into());
            }
        }

        let values = schema
            .fields
            .iter()
            .zip(supplied)
            .map(|(field, value)| coerce(field, value.unwrap_or_else(|| field.initial_value())))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { schema, values })
    }

    pub fn schema(&self) -> &'static Schema {
        self.schema
    }

    pub fn field_names(&self) -> Vec<&'static str> {
        self.schema.field_names()
    }

    fn index(&self, name: &str) -> Result<usize, RecordError> {
        self.schema
            .index_of(name)
            .ok_or_else(|| RecordError::UnknownField {
                schema: self.schema.name,
                field: name.to_string(),
            })
    }

    /// Validate and store one field
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), RecordError> {
        let index = self.index(name)?;
        let stored = coerce(&self.schema.fields[index], value.into())?;
        self.values[index] = stored;
        Ok(())
    }

    /// Append entries to a keyword-list field; commas separate entries
    pub fn push_keyword(&mut self, name: &str, entry: &str) -> Result<(), RecordError> {
        let index = self.index(name)?;
        let field = &self.schema.fields[index];
        if field.kind != FieldKind::Keywords {
            return Err(RecordError::TypeMismatch {
                field: field.name.to_string(),
                value: entry.to_string(),
                expected: FieldKind::Keywords.type_name(),
                hint: field.description,
            });
        }

        if let Value::List(items) = &mut self.values[index] {
            items.extend(split_keywords(entry));
        }
        Ok(())
    }

    /// Raw stored value
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.schema.index_of(name).map(|i| &self.values[i])
    }

    /// Stored text of a string field
    pub fn str_of(&self, name: &str) -> Option<&str> {
        self.value_of(name).and_then(Value::as_str)
    }

    pub fn int_of(&self, name: &str) -> Option<i64> {
        self.value_of(name).and_then(Value::as_i64)
    }

    /// Date or date-time field as a date-time; date-only fields are at midnight
    pub fn date_time_of(&self, name: &str) -> Option<NaiveDateTime> {
        match self.value_of(name)? {
            Value::DateTime(dt) => Some(*dt),
            Value::Date(d) => Some(d.and_time(NaiveTime::MIN)),
            _ => None,
        }
    }

    /// Plain rendering; `None` for null or unknown fields
    pub fn display_of(&self, name: &str) -> Option<String> {
        let index = self.schema.index_of(name)?;
        render(&self.values[index])
    }

    /// Rendering escaped for a shell command line; `None` for null or unknown fields
    pub fn shell_escaped_value_of(&self, name: &str) -> Option<String> {
        self.display_of(name).map(|s| escape_shell_arg(&s))
    }

    /// Ordered mapping of every field, dates rendered through the display rule
    pub fn to_mapping(&self) -> FieldMap {
        self.fields()
            .map(|(field, value)| (field.name, output_value(value)))
            .collect()
    }

    /// Like [`Record::to_mapping`] with strings shell-escaped; null fields are left out
    pub fn to_escaped_mapping(&self) -> FieldMap {
        self.fields()
            .filter(|(_, value)| !value.is_null())
            .map(|(field, value)| {
                let escaped = match output_value(value) {
                    Value::Text(s) => Value::Text(escape_shell_arg(&s)),
                    other => other,
                };
                (field.name, escaped)
            })
            .collect()
    }

    /// Rendered values in field order, for CSV/TSV rows
    pub fn to_row(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|value| match value {
                Value::Bool(b) => String::from(if *b { "1" } else { "0" }),
                other => render(other).unwrap_or_default(),
            })
            .collect()
    }

    /// Field definitions paired with their stored values, in schema order
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldDef, &Value)> {
        self.schema.fields.iter().zip(self.values.iter())
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_mapping().serialize(serializer)
    }
}

fn render(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(b.to_string()),
        Value::Int(i) => Some(i.to_string()),
        Value::Text(s) => Some(s.clone()),
        Value::Date(d) => Some(date::display_date(d)),
        Value::DateTime(dt) => Some(date::display_date_time(dt)),
        Value::List(items) => Some(items.join(", ")),
    }
}

fn output_value(value: &Value) -> Value {
    match value {
        Value::Null | Value::Bool(_) | Value::Int(_) | Value::Text(_) => value.clone(),
        other => Value::Text(render(other).unwrap_or_default()),
    }
}
