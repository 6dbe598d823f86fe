//! JSON dump of any SQLite file
//!
//! Works on files that were not created by these tools: tables are listed
//! from `sqlite_master` and each value is decoded by its storage class.

use crate::{Error, Result};
use serde_json::{Map, Number, Value as Json};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row, SqlitePool, TypeInfo, ValueRef};
use std::path::Path;
use tracing::{debug, warn};

/// Open an existing SQLite file without write access
pub async fn open_read_only(path: &Path) -> Result<SqlitePool> {
    if !path.is_file() {
        return Err(Error::NotFound(path.display().to_string()));
    }
    let options = SqliteConnectOptions::new().filename(path).read_only(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// User tables, by name
pub async fn table_names(pool: &SqlitePool) -> Result<Vec<String>> {
    let names = sqlx::query_scalar(
        "SELECT name FROM sqlite_master \
         WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
    )
    .fetch_all(pool)
    .await?;
    Ok(names)
}

/// Every row of `table` as a JSON object with columns in table order
pub async fn dump_table(pool: &SqlitePool, table: &str) -> Result<Vec<Json>> {
    let query = format!("SELECT * FROM \"{}\"", table.replace('"', "\"\""));
    let rows = sqlx::query(&query).fetch_all(pool).await?;
    rows.iter().map(row_to_json).collect()
}

/// Every table as `{ table: [rows...] }`
///
/// A table that cannot be read (e.g. a virtual table whose module is not
/// loaded) is logged and left out.
pub async fn dump_database(pool: &SqlitePool) -> Result<Map<String, Json>> {
    let mut tables = Map::new();
    for name in table_names(pool).await? {
        match dump_table(pool, &name).await {
            Ok(rows) => {
                debug!("{}: {} rows", name, rows.len());
                tables.insert(name, Json::Array(rows));
            }
            Err(e) => warn!("Skipping table {}: {}", name, e),
        }
    }
    Ok(tables)
}

fn row_to_json(row: &SqliteRow) -> Result<Json> {
    let mut object = Map::new();
    for column in row.columns() {
        let index = column.ordinal();
        object.insert(column.name().to_string(), cell_to_json(row, index)?);
    }
    Ok(Json::Object(object))
}

fn cell_to_json(row: &SqliteRow, index: usize) -> Result<Json> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Json::Null);
    }
    let storage = raw.type_info().name().to_string();

    let value = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => Json::from(row.try_get_unchecked::<i64, _>(index)?),
        "REAL" => Number::from_f64(row.try_get_unchecked::<f64, _>(index)?)
            .map(Json::Number)
            .unwrap_or(Json::Null),
        "BLOB" => Json::String(hex(&row.try_get_unchecked::<Vec<u8>, _>(index)?)),
        _ => Json::String(row.try_get_unchecked::<String, _>(index)?),
    };
    Ok(value)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(hex(&[0x00, 0xab, 0x7f]), "00ab7f");
        assert_eq!(hex(&[]), "");
    }
}
