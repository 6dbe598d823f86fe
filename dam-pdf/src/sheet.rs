//! Rows of the sheet music spreadsheet
//!
//! The spreadsheet is kept in forScore's layout (`File Name`, `Title`,
//! `Composer`, `Ensemble`, `Keywords`) plus columns the database stores as
//! keyword pairs: `Start Page`, `Arranger`, `Text`, `Key`, `Duration`,
//! `Publisher`, `Year`, `Plate`, `Rating` and `Difficulty`. A plain export of
//! the `meta` table reads the same way, since field names resolve directly.

use dam_common::record::Record;
use dam_common::schemas::{FORSCORE_META, PDF_META};
use dam_common::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));

/// Integer columns of the `meta` table taken as they are
const NUMERIC_FIELDS: [&str; 5] = ["rating", "difficulty", "duration", "keysf", "keymi"];

/// Trim and collapse runs of whitespace to one space
pub fn collapse(value: &str) -> String {
    WHITESPACE.replace_all(value.trim(), " ").into_owned()
}

/// Sharps (+) or flats (-) and minor flag for a key name
///
/// Major keys are capitalized (`Eb`), minor keys lower case (`c#`).
pub fn key_signature(name: &str) -> Option<(i64, i64)> {
    let pair = match name {
        "Cb" => (-7, 0),
        "Gb" => (-6, 0),
        "Db" => (-5, 0),
        "Ab" => (-4, 0),
        "Eb" => (-3, 0),
        "Bb" => (-2, 0),
        "F" => (-1, 0),
        "C" => (0, 0),
        "G" => (1, 0),
        "D" => (2, 0),
        "A" => (3, 0),
        "E" => (4, 0),
        "B" => (5, 0),
        "F#" => (6, 0),
        "C#" => (7, 0),
        "ab" => (-7, 1),
        "eb" => (-6, 1),
        "bb" => (-5, 1),
        "f" => (-4, 1),
        "c" => (-3, 1),
        "g" => (-2, 1),
        "d" => (-1, 1),
        "a" => (0, 1),
        "e" => (1, 1),
        "b" => (2, 1),
        "f#" => (3, 1),
        "c#" => (4, 1),
        "g#" => (5, 1),
        "d#" => (6, 1),
        "a#" => (7, 1),
        _ => return None,
    };
    Some(pair)
}

/// Seconds in `h:mm:ss`, `m:ss` or a plain number of seconds
pub fn parse_duration(text: &str) -> Option<i64> {
    let parts: Vec<&str> = text.trim().split(':').collect();
    if parts.len() > 3 {
        return None;
    }
    parts.iter().try_fold(0i64, |seconds, part| {
        let n = part.trim().parse::<u32>().ok()?;
        seconds.checked_mul(60)?.checked_add(i64::from(n))
    })
}

/// Whole number from a cell; spreadsheets may write `1923.0`
fn whole_number(header: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().map(|f| f.trunc() as i64))
        .ok_or_else(|| Error::InvalidInput(format!("{}: '{}' is not a number", header, value)))
}

/// Keyword pairs for one spreadsheet-only column
fn column_keywords(header: &str, value: &str) -> Result<Vec<String>> {
    let names = |prefix: &str| -> Vec<String> {
        value
            .split(',')
            .map(collapse)
            .filter(|n| !n.is_empty())
            .map(|n| format!("{}:{}", prefix, n))
            .collect()
    };

    let keywords = match header {
        "Start Page" => vec![format!("s_page:{}", value)],
        "Arranger" => names("arranger"),
        "Text" => names("text"),
        "Key" => {
            let (sf, mi) = key_signature(value)
                .ok_or_else(|| Error::InvalidInput(format!("Key: unknown key '{}'", value)))?;
            vec![format!("keysf:{}", sf), format!("keymi:{}", mi)]
        }
        "Duration" => {
            let seconds = parse_duration(value).ok_or_else(|| {
                Error::InvalidInput(format!("Duration: '{}' is not a time", value))
            })?;
            vec![format!("duration:{}", seconds)]
        }
        "Publisher" => vec![format!("publisher:{}", value)],
        "Plate" => vec![format!("plate:{}", value)],
        "Year" | "Rating" | "Difficulty" => vec![format!(
            "{}:{}",
            header.to_ascii_lowercase(),
            whole_number(header, value)?
        )],
        _ => Vec::new(),
    };
    Ok(keywords)
}

/// Build a `pdf_meta` record from one spreadsheet row
pub fn meta_from_row<'a>(cells: impl IntoIterator<Item = (&'a str, &'a str)>) -> Result<Record> {
    let cells: Vec<(&str, String)> = cells
        .into_iter()
        .map(|(header, value)| (header, collapse(value)))
        .collect();

    let mut sheet = Record::construct(
        &FORSCORE_META,
        cells.iter().map(|(h, v)| (*h, v.as_str())),
    )?;
    for (header, value) in cells.iter().filter(|(_, v)| !v.is_empty()) {
        for keyword in column_keywords(header, value)? {
            sheet.push_keyword("keywords", &keyword)?;
        }
    }

    let mut meta: Vec<(&str, String)> = ["filename", "title", "author", "subject", "keywords"]
        .into_iter()
        .map(|field| (field, sheet.display_of(field).unwrap_or_default()))
        .collect();
    meta.extend(
        cells
            .iter()
            .filter(|(h, _)| NUMERIC_FIELDS.contains(h))
            .map(|(h, v)| (*h, v.clone())),
    );

    Ok(Record::construct(&PDF_META, meta)?)
}
