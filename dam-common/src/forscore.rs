//! forScore metadata import CSV
//!
//! forScore has columns for some facts the music database keeps as keyword
//! pairs (`arranger:Name`, `year:1923`, ...). Those pairs are moved into
//! their columns; every other keyword stays a tag. forScore has no column for
//! text authors, plate numbers or years, so those are re-added to the tags.

use std::io::Write;
use std::path::Path;

use csv::WriterBuilder;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::{Record, Value};
use crate::Result;

pub const HEADER: [&str; 15] = [
    "Filename",
    "Title",
    "Start Page (Bookmark)",
    "End Page (Bookmark)",
    "Composers",
    "Genres",
    "Tags",
    "Publisher",
    "Arranger",
    "Rating",
    "Difficulty",
    "Minutes",
    "Seconds",
    "keysf",
    "keymi",
];

static PAIR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:(?P<key>arranger|text|publisher|plate):(?P<text>.+)|(?P<num_key>year|rating|difficulty|keymi|duration):(?P<num>\d+)|keysf:(?P<keysf>-?\d+))$",
    )
    .expect("static regex")
});

/// Keyword list split into forScore columns
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct KeywordPairs {
    pub arrangers: Vec<String>,
    pub texts: Vec<String>,
    pub publisher: String,
    pub year: String,
    pub plate: String,
    pub rating: Option<i64>,
    pub difficulty: Option<i64>,
    pub keysf: Option<i64>,
    pub keymi: Option<i64>,
    /// Seconds
    pub duration: Option<i64>,
    pub tags: Vec<String>,
}

impl KeywordPairs {
    /// Sort keyword entries into pairs and plain tags; later pairs win
    pub fn extract<'a>(entries: impl IntoIterator<Item = &'a str>) -> Self {
        let mut pairs = Self::default();

        for entry in entries.into_iter().map(str::trim).filter(|e| !e.is_empty()) {
            let Some(caps) = PAIR.captures(entry) else {
                pairs.tags.push(entry.to_string());
                continue;
            };

            if let (Some(key), Some(text)) = (caps.name("key"), caps.name("text")) {
                let text = text.as_str().trim().to_string();
                match key.as_str() {
                    "arranger" => pairs.arrangers.push(text),
                    "text" => pairs.texts.push(text),
                    "publisher" => pairs.publisher = text,
                    _ => pairs.plate = text,
                }
            } else if let (Some(key), Some(num)) = (caps.name("num_key"), caps.name("num")) {
                let number = num.as_str().parse::<i64>().ok();
                match key.as_str() {
                    "year" => pairs.year = num.as_str().to_string(),
                    "rating" => pairs.rating = number,
                    "difficulty" => pairs.difficulty = number,
                    "keymi" => pairs.keymi = number,
                    _ => pairs.duration = number,
                }
            } else if let Some(keysf) = caps.name("keysf") {
                pairs.keysf = keysf.as_str().parse().ok();
            }
        }
        pairs
    }

    /// Remaining tags followed by the re-added text, plate and year pairs
    pub fn tags_with_pairs(&self) -> Vec<String> {
        let mut tags = self.tags.clone();
        tags.extend(self.texts.iter().map(|t| format!("text:{}", t)));
        if !self.plate.is_empty() {
            tags.push(format!("plate:{}", self.plate));
        }
        if !self.year.is_empty() {
            tags.push(format!("year:{}", self.year));
        }
        tags
    }
}

/// `(minutes, seconds)` as forScore cells; both blank when there is no duration
pub fn split_duration(seconds: i64) -> (String, String) {
    if seconds <= 0 {
        (String::new(), String::new())
    } else {
        ((seconds / 60).to_string(), (seconds % 60).to_string())
    }
}

fn keyword_entries(meta: &Record) -> Vec<String> {
    match meta.value_of("keywords") {
        Some(Value::List(items)) => items.clone(),
        Some(Value::Text(text)) => text.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

/// One forScore row for a sheet music record
///
/// A set numeric column wins over the matching keyword pair.
pub fn forscore_row(meta: &Record) -> Vec<String> {
    let entries = keyword_entries(meta);
    let pairs = KeywordPairs::extract(entries.iter().map(String::as_str));

    let rating = meta.int_of("rating").or(pairs.rating).unwrap_or(0);
    let difficulty = meta.int_of("difficulty").or(pairs.difficulty).unwrap_or(0);
    let duration = meta.int_of("duration").or(pairs.duration).unwrap_or(0);
    let keysf = meta.int_of("keysf").or(pairs.keysf);
    let keymi = meta.int_of("keymi").or(pairs.keymi);
    let (minutes, seconds) = split_duration(duration);
    let text = |field: &str| meta.display_of(field).unwrap_or_default();

    vec![
        text("filename"),
        text("title"),
        String::new(),
        String::new(),
        text("author"),
        text("subject"),
        pairs.tags_with_pairs().join(", "),
        pairs.publisher.clone(),
        pairs.arrangers.join(", "),
        rating.to_string(),
        difficulty.to_string(),
        minutes,
        seconds,
        keysf.map(|k| k.to_string()).unwrap_or_default(),
        keymi.map(|k| k.to_string()).unwrap_or_default(),
    ]
}

pub fn write_forscore_to<W: Write>(writer: W, records: &[Record]) -> Result<usize> {
    let mut writer = WriterBuilder::new().from_writer(writer);
    writer.write_record(HEADER)?;
    for record in records {
        writer.write_record(forscore_row(record))?;
    }
    writer.flush()?;
    Ok(records.len())
}

/// Write the forScore CSV to `path`; returns the row count
pub fn export_forscore(path: &Path, records: &[Record]) -> Result<usize> {
    let file = std::fs::File::create(path)?;
    write_forscore_to(file, records)
}
