//! Column synchronization for database files created by older releases
//!
//! Tables are created with `CREATE TABLE IF NOT EXISTS`, which leaves an
//! existing table untouched. When a schema gains a field (the recordings log
//! gained `title`, the music table gained `rating` and friends), the column
//! is added here with `ALTER TABLE ADD COLUMN`. Type drift is reported but
//! never repaired: SQLite cannot change a column type in place.

use crate::Result;
use sqlx::{Row, SqlitePool};
use tracing::{debug, info, warn};

/// Expected column of a table
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    /// `INTEGER` or `TEXT`
    pub sql_type: String,
    pub primary_key: bool,
    /// SQL literal, e.g. `''`
    pub default_value: Option<String>,
}

impl ColumnDefinition {
    pub fn new(name: impl Into<String>, sql_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sql_type: sql_type.into(),
            primary_key: false,
            default_value: None,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Column clause for CREATE TABLE and ALTER TABLE
    pub fn to_sql(&self) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type);
        if self.primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if let Some(default) = &self.default_value {
            sql.push_str(" DEFAULT ");
            sql.push_str(default);
        }
        sql
    }
}

/// Row of `PRAGMA table_info`
#[derive(Debug, Clone)]
pub struct ActualColumn {
    pub cid: i32,
    pub name: String,
    pub type_name: String,
    pub pk: bool,
}

/// Difference between the expected and the stored layout
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaDrift {
    MissingColumn {
        table: String,
        column: ColumnDefinition,
    },
    TypeMismatch {
        table: String,
        column: String,
        expected: String,
        actual: String,
    },
}

pub struct SchemaIntrospector;

impl SchemaIntrospector {
    /// Columns of `table_name` in declaration order
    pub async fn introspect_table(pool: &SqlitePool, table_name: &str) -> Result<Vec<ActualColumn>> {
        let query = format!("PRAGMA table_info({})", table_name);
        let rows = sqlx::query(&query).fetch_all(pool).await?;

        let mut columns = rows
            .iter()
            .map(|row| {
                Ok(ActualColumn {
                    cid: row.try_get("cid")?,
                    name: row.try_get("name")?,
                    type_name: row.try_get("type")?,
                    pk: row.try_get::<i32, _>("pk")? != 0,
                })
            })
            .collect::<std::result::Result<Vec<_>, sqlx::Error>>()?;

        columns.sort_by_key(|c| c.cid);
        Ok(columns)
    }

    pub async fn table_exists(pool: &SqlitePool, table_name: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?)",
        )
        .bind(table_name)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }
}

pub struct SchemaDiff;

impl SchemaDiff {
    pub fn compare(
        table_name: &str,
        expected: &[ColumnDefinition],
        actual: &[ActualColumn],
    ) -> Vec<SchemaDrift> {
        expected
            .iter()
            .filter_map(|want| match actual.iter().find(|c| c.name == want.name) {
                None => Some(SchemaDrift::MissingColumn {
                    table: table_name.to_string(),
                    column: want.clone(),
                }),
                Some(have) if !Self::types_compatible(&want.sql_type, &have.type_name) => {
                    Some(SchemaDrift::TypeMismatch {
                        table: table_name.to_string(),
                        column: want.name.clone(),
                        expected: want.sql_type.clone(),
                        actual: have.type_name.clone(),
                    })
                }
                Some(_) => None,
            })
            .collect()
    }

    /// Same SQLite type affinity
    pub fn types_compatible(expected: &str, actual: &str) -> bool {
        let exp = expected.to_uppercase();
        let act = actual.to_uppercase();

        if exp == act {
            return true;
        }

        let is_integer = |t: &str| t.contains("INT");
        let is_text = |t: &str| t.contains("TEXT") || t.contains("CHAR") || t.contains("CLOB");

        (is_integer(&exp) && is_integer(&act)) || (is_text(&exp) && is_text(&act))
    }
}

pub struct SchemaSync;

impl SchemaSync {
    /// Add every expected column missing from `table`; returns the added names
    pub async fn sync_columns(
        pool: &SqlitePool,
        table: &str,
        expected: &[ColumnDefinition],
    ) -> Result<Vec<String>> {
        if !SchemaIntrospector::table_exists(pool, table).await? {
            warn!("Table '{}' does not exist, nothing to sync", table);
            return Ok(Vec::new());
        }

        let actual = SchemaIntrospector::introspect_table(pool, table).await?;
        let drift = SchemaDiff::compare(table, expected, &actual);
        if drift.is_empty() {
            debug!("Schema up to date for '{}'", table);
            return Ok(Vec::new());
        }

        let mut added = Vec::new();
        for change in drift {
            match change {
                SchemaDrift::MissingColumn { table, column } => {
                    Self::add_column(pool, &table, &column).await?;
                    added.push(column.name);
                }
                SchemaDrift::TypeMismatch {
                    table,
                    column,
                    expected,
                    actual,
                } => {
                    warn!(
                        "Type mismatch in {}.{}: expected '{}', found '{}'",
                        table, column, expected, actual
                    );
                }
            }
        }
        Ok(added)
    }

    pub async fn add_column(pool: &SqlitePool, table: &str, column: &ColumnDefinition) -> Result<()> {
        if column.primary_key {
            warn!(
                "Cannot add PRIMARY KEY column {}.{}; adding it as a plain column",
                table, column.name
            );
        }
        let plain = ColumnDefinition {
            primary_key: false,
            ..column.clone()
        };
        let sql = format!("ALTER TABLE {} ADD COLUMN {}", table, plain.to_sql());

        info!("Adding column {}.{} ({})", table, column.name, column.sql_type);

        match sqlx::query(&sql).execute(pool).await {
            Ok(_) => Ok(()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("duplicate column") => {
                debug!("Column {}.{} already present", table, column.name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}
