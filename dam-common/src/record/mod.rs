//! Typed records
//!
//! A record is a fixed set of named, typed fields (see [`Schema`]). Values are
//! validated when written, never later: a string longer than its bound, a
//! negative unsigned integer or unparseable input is rejected at the call
//! that supplied it.
//!
//! # Example
//!
//! ```rust
//! use dam_common::record::{FieldDef, Record, Schema};
//!
//! static TAPE: Schema = Schema::new(
//!     "tape",
//!     &[FieldDef::bounded("medium", 8), FieldDef::unsigned("minutes")],
//! );
//!
//! let mut tape = Record::construct(&TAPE, [("medium", " DAT ")]).unwrap();
//! assert_eq!(tape.str_of("medium"), Some("DAT"));
//! assert!(tape.set("minutes", -5i64).is_err());
//! assert!(tape.set("medium", "BETAMAX-HIFI").is_err());
//! ```

mod coerce;
pub mod date;
mod field;
mod instance;
mod schema;
mod value;

use thiserror::Error;

pub use field::{FieldDef, FieldDefault, FieldKind};
pub use instance::Record;
pub use schema::Schema;
pub use value::{FieldMap, Value};

/// Validation failure for a single field write
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// Input cannot be converted to the field's type
    #[error("{field}: cannot convert {value:?} to {expected}{}", format_hint(.hint))]
    TypeMismatch {
        field: String,
        value: String,
        expected: &'static str,
        /// Field description, empty when the schema gives none
        hint: &'static str,
    },

    /// Trimmed string is longer (in bytes) than the field allows
    #[error("{field}: STRING TOO LONG: {value:?} HAS LENGTH {length}, LENGTH SHOULD BE AT MOST {max}")]
    LengthExceeded {
        field: String,
        value: String,
        length: usize,
        max: usize,
    },

    /// Integer outside the field's domain
    #[error("{field}: value {value} out of range [{min}, {max}]")]
    RangeError {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// The schema has no field with this name
    #[error("{schema} has no field named {field:?}")]
    UnknownField { schema: &'static str, field: String },
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!(" ({})", hint)
    }
}

impl RecordError {
    /// Name of the field that rejected the value
    pub fn field(&self) -> &str {
        match self {
            RecordError::TypeMismatch { field, .. }
            | RecordError::LengthExceeded { field, .. }
            | RecordError::RangeError { field, .. }
            | RecordError::UnknownField { field, .. } => field,
        }
    }
}
