//! Field definitions
//!
//! A field is a name, a [`FieldKind`] and a default. Definitions are `const`
//! so record schemas can be declared as statics.

use chrono::{NaiveDate, NaiveDateTime};

use super::value::Value;

/// Semantic type of a record field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Trimmed string with a maximum byte length; overflow is rejected
    Bounded { max_len: usize },
    /// Trimmed string, any length
    Trimmed,
    /// String stored verbatim
    Text,
    /// Non-negative integer
    Unsigned,
    /// Signed integer
    Signed,
    /// Signed integer in a closed interval
    Ranged { min: i64, max: i64 },
    Boolean,
    /// Calendar date without time of day
    Date,
    /// Calendar date with time of day
    DateTime,
    /// List of trimmed entries rendered comma-separated
    Keywords,
}

impl FieldKind {
    /// Name used in type mismatch errors
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::Bounded { .. } | FieldKind::Trimmed | FieldKind::Text => "string",
            FieldKind::Unsigned => "unsigned integer",
            FieldKind::Signed | FieldKind::Ranged { .. } => "integer",
            FieldKind::Boolean => "boolean",
            FieldKind::Date => "date",
            FieldKind::DateTime => "date-time",
            FieldKind::Keywords => "keyword list",
        }
    }

    /// Whether the kind is stored as an SQLite INTEGER
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            FieldKind::Unsigned | FieldKind::Signed | FieldKind::Ranged { .. } | FieldKind::Boolean
        )
    }

    /// Value a non-nullable field takes when nothing is supplied
    pub fn zero_value(&self) -> Value {
        match self {
            FieldKind::Bounded { .. } | FieldKind::Trimmed | FieldKind::Text => {
                Value::Text(String::new())
            }
            FieldKind::Unsigned | FieldKind::Signed => Value::Int(0),
            // Zero when the interval allows it, otherwise the nearest bound
            FieldKind::Ranged { min, max } => Value::Int(0.clamp(*min, *max)),
            FieldKind::Boolean => Value::Bool(false),
            FieldKind::Date => Value::Date(NaiveDate::default()),
            FieldKind::DateTime => Value::DateTime(NaiveDateTime::default()),
            FieldKind::Keywords => Value::List(Vec::new()),
        }
    }
}

/// Default applied when a construction input omits a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Null for nullable fields, the kind's zero value otherwise
    Zero,
    Text(&'static str),
    Int(i64),
    Bool(bool),
}

impl FieldDefault {
    pub(crate) fn to_value(self) -> Value {
        match self {
            FieldDefault::Zero => Value::Null,
            FieldDefault::Text(s) => Value::Text(s.to_string()),
            FieldDefault::Int(i) => Value::Int(i),
            FieldDefault::Bool(b) => Value::Bool(b),
        }
    }
}

/// One field of a record schema
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub kind: FieldKind,
    pub default: FieldDefault,
    pub nullable: bool,
    pub description: &'static str,
}

impl FieldDef {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            kind,
            default: FieldDefault::Zero,
            nullable: false,
            description: "",
        }
    }

    pub const fn bounded(name: &'static str, max_len: usize) -> Self {
        Self::new(name, FieldKind::Bounded { max_len })
    }

    pub const fn trimmed(name: &'static str) -> Self {
        Self::new(name, FieldKind::Trimmed)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, FieldKind::Text)
    }

    pub const fn unsigned(name: &'static str) -> Self {
        Self::new(name, FieldKind::Unsigned)
    }

    pub const fn signed(name: &'static str) -> Self {
        Self::new(name, FieldKind::Signed)
    }

    pub const fn ranged(name: &'static str, min: i64, max: i64) -> Self {
        Self::new(name, FieldKind::Ranged { min, max })
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Boolean)
    }

    pub const fn date(name: &'static str) -> Self {
        Self::new(name, FieldKind::Date)
    }

    pub const fn date_time(name: &'static str) -> Self {
        Self::new(name, FieldKind::DateTime)
    }

    pub const fn keywords(name: &'static str) -> Self {
        Self::new(name, FieldKind::Keywords)
    }

    /// Missing, null and blank input store Null instead of a zero value
    pub const fn nullable(self) -> Self {
        Self {
            nullable: true,
            ..self
        }
    }

    pub const fn with_default(self, default: FieldDefault) -> Self {
        Self { default, ..self }
    }

    pub const fn describe(self, description: &'static str) -> Self {
        Self {
            description,
            ..self
        }
    }

    /// Value used by construction when the input has no entry for this field
    pub(crate) fn initial_value(&self) -> Value {
        self.default.to_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_const_builders() {
        const RATING: FieldDef = FieldDef::ranged("rating", 0, 5)
            .nullable()
            .describe("Whole number between 0 and 5");

        assert_eq!(RATING.kind, FieldKind::Ranged { min: 0, max: 5 });
        assert!(RATING.nullable);
        assert_eq!(RATING.default, FieldDefault::Zero);
        assert_eq!(RATING.description, "Whole number between 0 and 5");
    }

    #[test]
    fn test_zero_values() {
        assert_eq!(FieldKind::Bounded { max_len: 8 }.zero_value(), Value::Text(String::new()));
        assert_eq!(FieldKind::Unsigned.zero_value(), Value::Int(0));
        assert_eq!(FieldKind::Ranged { min: 1, max: 3 }.zero_value(), Value::Int(1));
        assert_eq!(FieldKind::Boolean.zero_value(), Value::Bool(false));
    }

    #[test]
    fn test_integer_kinds() {
        assert!(FieldKind::Boolean.is_integer());
        assert!(FieldKind::Ranged { min: -7, max: 7 }.is_integer());
        assert!(!FieldKind::DateTime.is_integer());
        assert!(!FieldKind::Keywords.is_integer());
    }
}
