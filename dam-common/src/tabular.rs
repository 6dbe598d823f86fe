//! CSV and TSV files of records
//!
//! The delimiter follows the file extension. Header cells are matched to
//! schema fields by name or alias; columns the schema does not know are
//! ignored. Each data row validates on its own, so one bad row does not
//! stop an import.

use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use tracing::debug;

use crate::record::{Record, Schema};
use crate::{Error, Result};

const BOM: char = '\u{feff}';

/// Field delimiter for `path`: tab for `.tsv`, comma for `.csv`
pub fn delimiter_for(path: &Path) -> Result<u8> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("tsv") => Ok(b'\t'),
        Some("csv") => Ok(b','),
        _ => Err(Error::InvalidInput(format!(
            "{}: expected a .csv or .tsv file",
            path.display()
        ))),
    }
}

/// One data row of an imported file
#[derive(Debug)]
pub struct ImportedRow {
    /// 1-based line number in the file
    pub line: u64,
    pub record: Result<Record>,
}

pub fn read_records(path: &Path, schema: &'static Schema) -> Result<Vec<ImportedRow>> {
    let delimiter = delimiter_for(path)?;
    let file = std::fs::File::open(path)?;
    let rows = read_records_from(file, delimiter, schema)?;
    debug!("Read {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Header cells and data rows of a file, before any validation
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    /// 1-based line number and cells of each data row
    pub rows: Vec<(u64, Vec<String>)>,
}

impl RawTable {
    /// Header/cell pairs of one row; short rows pair with fewer headers
    pub fn pairs<'a>(&'a self, cells: &'a [String]) -> impl Iterator<Item = (&'a str, &'a str)> {
        self.headers
            .iter()
            .map(String::as_str)
            .zip(cells.iter().map(String::as_str))
    }
}

pub fn read_table(path: &Path) -> Result<RawTable> {
    let delimiter = delimiter_for(path)?;
    let file = std::fs::File::open(path)?;
    read_table_from(file, delimiter)
}

pub fn read_table_from<R: Read>(reader: R, delimiter: u8) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches(BOM).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        rows.push((line, row.iter().map(str::to_string).collect()));
    }
    Ok(RawTable { headers, rows })
}

/// Parse rows from any reader; fails only when the file itself is unreadable
pub fn read_records_from<R: Read>(
    reader: R,
    delimiter: u8,
    schema: &'static Schema,
) -> Result<Vec<ImportedRow>> {
    let table = read_table_from(reader, delimiter)?;
    Ok(table
        .rows
        .iter()
        .map(|(line, cells)| ImportedRow {
            line: *line,
            record: Record::construct(schema, table.pairs(cells))
                .map_err(|source| Error::Row { line: *line, source }),
        })
        .collect())
}

/// Write a header of field names and one row per record; returns the row count
pub fn write_records(path: &Path, schema: &'static Schema, records: &[Record]) -> Result<usize> {
    let delimiter = delimiter_for(path)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let file = std::fs::File::create(path)?;
    write_records_to(file, delimiter, schema, records)
}

pub fn write_records_to<W: Write>(
    writer: W,
    delimiter: u8,
    schema: &'static Schema,
    records: &[Record],
) -> Result<usize> {
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(writer);

    writer.write_record(schema.field_names())?;
    for record in records {
        if !std::ptr::eq(record.schema(), schema) {
            return Err(Error::InvalidInput(format!(
                "cannot write a {} record as {}",
                record.schema().name,
                schema.name
            )));
        }
        writer.write_record(record.to_row())?;
    }
    writer.flush()?;
    Ok(records.len())
}
