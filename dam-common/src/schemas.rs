//! Record schemas used by the tools
//!
//! Lengths follow the BWF bext chunk layout and the column widths of the
//! recording log; the bext `Reserved` and `CodingHistory` areas are kept as
//! unbounded text.

use crate::record::{FieldDef, Schema};

/// BWF broadcast-extension ("bext") chunk
pub static BEXT: Schema = Schema::new(
    "bext",
    &[
        FieldDef::bounded("Description", 256),
        FieldDef::bounded("Originator", 32),
        FieldDef::bounded("OriginatorReference", 32),
        FieldDef::bounded("OriginatorDate", 10).describe("YYYY-MM-DD"),
        FieldDef::bounded("OriginatorTime", 8).describe("HH:MM:SS"),
        FieldDef::unsigned("TimeReference").describe("Samples since midnight"),
        FieldDef::unsigned("Version"),
        FieldDef::bounded("UMID", 64),
        FieldDef::signed("LoudnessValue"),
        FieldDef::unsigned("LoudnessRange"),
        FieldDef::signed("MaxTruePeakLevel"),
        FieldDef::signed("MaxMomentaryLoudness"),
        FieldDef::signed("MaxShortTermLoudness"),
        FieldDef::text("Reserved"),
        FieldDef::text("CodingHistory"),
    ],
);

/// One recording session in the recording projects log
pub static RECORDING: Schema = Schema::new(
    "recording",
    &[
        FieldDef::bounded("tape", 64).describe("Name of tape"),
        FieldDef::bounded("location", 64).describe("Recording address"),
        FieldDef::date_time("recorded_on").describe("YYYY-MM-DD[ HH:MM]"),
        FieldDef::bounded("reference", 20)
            .describe("Device serial and model; the date is appended for 32 characters total"),
        FieldDef::bounded("medium", 8).describe("VHS, 8MM, DAT"),
        FieldDef::bounded("encoding", 8).describe("PCM, FM, analog tape"),
        FieldDef::date("loaded_on").describe("Date the session was loaded"),
        FieldDef::bounded("session", 64).describe("Session directory name"),
        FieldDef::trimmed("notes"),
        FieldDef::date("edited_on"),
        FieldDef::date("uploaded_on"),
        FieldDef::bounded("title", 32),
        FieldDef::bounded("description", 256),
        FieldDef::bounded("performers", 64).describe("Group that was recorded"),
    ],
);

/// Metadata row for one sheet music PDF
pub static PDF_META: Schema = Schema::new(
    "pdf_meta",
    &[
        FieldDef::text("filename"),
        FieldDef::trimmed("title"),
        FieldDef::trimmed("author").describe("Composers, comma-separated"),
        FieldDef::trimmed("subject").describe("Genres or ensemble, comma-separated"),
        FieldDef::trimmed("keywords").describe("Tags, comma-separated"),
        FieldDef::ranged("rating", 0, 5).nullable(),
        FieldDef::ranged("difficulty", 0, 3).nullable(),
        FieldDef::unsigned("duration").nullable().describe("Seconds"),
        FieldDef::ranged("keysf", -7, 7).nullable().describe("Sharps (+) or flats (-)"),
        FieldDef::ranged("keymi", 0, 1).nullable().describe("0 major, 1 minor"),
    ],
);

/// Row of the forScore metadata spreadsheet
pub static FORSCORE_META: Schema = Schema::new(
    "forscore_meta",
    &[
        FieldDef::trimmed("filename"),
        FieldDef::trimmed("title"),
        FieldDef::trimmed("author").describe("Composer"),
        FieldDef::trimmed("subject").describe("Genres or ensemble"),
        FieldDef::keywords("keywords"),
    ],
)
.with_aliases(&[
    ("File Name", "filename"),
    ("Title", "title"),
    ("Composer", "author"),
    ("Ensemble", "subject"),
    ("Keywords", "keywords"),
]);

/// All schemas, for lookup by name
pub static ALL: &[&Schema] = &[&BEXT, &RECORDING, &PDF_META, &FORSCORE_META];

pub fn by_name(name: &str) -> Option<&'static Schema> {
    ALL.iter().copied().find(|s| s.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{FieldKind, Record, RecordError, Value};

    #[test]
    fn test_field_names_unique() {
        for schema in ALL {
            assert_eq!(schema.duplicate_field(), None, "{} repeats a field", schema.name);
        }
    }

    #[test]
    fn test_bext_declares_true_peak_once() {
        let count = BEXT
            .fields
            .iter()
            .filter(|f| f.name == "MaxTruePeakLevel")
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_every_schema_builds_from_defaults() {
        for schema in ALL {
            assert!(Record::new(schema).is_ok(), "{} defaults invalid", schema.name);
        }
    }

    #[test]
    fn test_bext_bounds() {
        let mut bext = Record::new(&BEXT).unwrap();
        bext.set("OriginatorDate", "1991-05-11").unwrap();
        assert!(matches!(
            bext.set("OriginatorDate", "1991-05-11Z"),
            Err(RecordError::LengthExceeded { max: 10, .. })
        ));
        assert!(matches!(
            bext.set("LoudnessRange", -3i64),
            Err(RecordError::RangeError { .. })
        ));
        bext.set("LoudnessValue", -23i64).unwrap();
        bext.set("CodingHistory", "  A=PCM,F=48000  ").unwrap();
        assert_eq!(bext.str_of("CodingHistory"), Some("  A=PCM,F=48000  "));
    }

    #[test]
    fn test_pdf_meta_ranges() {
        let record = Record::construct(&PDF_META, vec![("rating", "6")]);
        assert!(matches!(
            record,
            Err(RecordError::RangeError { min: 0, max: 5, value: 6, .. })
        ));

        let record = Record::construct(&PDF_META, vec![("keysf", "-7"), ("keymi", "1")]).unwrap();
        assert_eq!(record.int_of("keysf"), Some(-7));
        assert_eq!(record.value_of("difficulty"), Some(&Value::Null));
    }

    #[test]
    fn test_forscore_aliases() {
        let record = Record::construct(
            &FORSCORE_META,
            vec![("File Name", "bach.pdf"), ("Composer", "Bach, J.S."), ("Ensemble", "Organ")],
        )
        .unwrap();
        assert_eq!(record.str_of("filename"), Some("bach.pdf"));
        assert_eq!(record.str_of("author"), Some("Bach, J.S."));
        assert_eq!(record.str_of("subject"), Some("Organ"));
        assert_eq!(
            FORSCORE_META.field("keywords").map(|f| f.kind),
            Some(FieldKind::Keywords)
        );
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(by_name("recording").map(|s| s.fields.len()), Some(14));
        assert!(by_name("missing").is_none());
    }
}
