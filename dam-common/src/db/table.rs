//! SQLite tables laid out from record schemas
//!
//! A [`TableLayout`] names the table, its integer id column, the unique key
//! used for upserts and the secondary indexes. Columns come from the schema:
//! integer kinds are stored as `INTEGER`, everything else as `TEXT`.
//!
//! Rows are decoded by storage class and passed back through
//! [`Record::construct`], so anything read from disk is validated again.

use crate::record::{date, FieldDef, Record, Schema, Value};
use crate::{Error, Result};
use sqlx::sqlite::{SqliteArguments, SqliteRow};
use sqlx::{query::Query, Row, Sqlite, SqlitePool, TypeInfo, ValueRef};
use tracing::{debug, info};

use super::schema_sync::{ColumnDefinition, SchemaSync};

#[derive(Debug, Clone, Copy)]
pub struct IndexDef {
    pub name: &'static str,
    pub columns: &'static [&'static str],
    pub unique: bool,
}

impl IndexDef {
    pub const fn new(name: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            name,
            columns,
            unique: false,
        }
    }

    pub const fn unique(name: &'static str, column: &'static [&'static str]) -> Self {
        Self {
            name,
            columns: column,
            unique: true,
        }
    }
}

#[derive(Debug)]
pub struct TableLayout {
    pub table: &'static str,
    pub id_column: &'static str,
    pub schema: &'static Schema,
    /// Column holding the natural key; must carry a unique index
    pub key_column: &'static str,
    pub indexes: &'static [IndexDef],
}

/// Value as written to or read from a column
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Text(String),
}

impl SqlValue {
    /// Storage form of a record value
    ///
    /// Dates before the cutoff year are stored empty, like their display.
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => SqlValue::Null,
            Value::Bool(b) => SqlValue::Integer(i64::from(*b)),
            Value::Int(i) => SqlValue::Integer(*i),
            Value::Text(s) => SqlValue::Text(s.clone()),
            Value::Date(d) if date::is_set(d) => SqlValue::Text(d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) if date::is_set(&dt.date()) => {
                SqlValue::Text(dt.format("%Y-%m-%d %H:%M:%S").to_string())
            }
            Value::Date(_) | Value::DateTime(_) => SqlValue::Text(String::new()),
            Value::List(items) => SqlValue::Text(items.join(", ")),
        }
    }

    fn into_value(self) -> Value {
        match self {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(i) => Value::Int(i),
            SqlValue::Text(s) => Value::Text(s),
        }
    }

    fn bind_to<'q>(
        self,
        query: Query<'q, Sqlite, SqliteArguments<'q>>,
    ) -> Query<'q, Sqlite, SqliteArguments<'q>> {
        match self {
            SqlValue::Null => query.bind(None::<String>),
            SqlValue::Integer(i) => query.bind(i),
            SqlValue::Text(s) => query.bind(s),
        }
    }
}

fn column_for(field: &FieldDef) -> ColumnDefinition {
    if field.kind.is_integer() {
        ColumnDefinition::new(field.name, "INTEGER")
    } else {
        ColumnDefinition::new(field.name, "TEXT").default("''")
    }
}

impl TableLayout {
    /// Id column followed by one column per schema field
    pub fn expected_columns(&self) -> Vec<ColumnDefinition> {
        std::iter::once(ColumnDefinition::new(self.id_column, "INTEGER").primary_key())
            .chain(self.schema.fields.iter().map(column_for))
            .collect()
    }

    pub fn create_table_sql(&self) -> String {
        let columns = self
            .expected_columns()
            .iter()
            .map(|c| format!("    {}", c.to_sql()))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE IF NOT EXISTS {} (\n{}\n)", self.table, columns)
    }

    pub fn index_sql(&self) -> Vec<String> {
        self.indexes
            .iter()
            .map(|index| {
                format!(
                    "CREATE {}INDEX IF NOT EXISTS {} ON {} ({})",
                    if index.unique { "UNIQUE " } else { "" },
                    index.name,
                    self.table,
                    index.columns.join(", ")
                )
            })
            .collect()
    }

    /// Create the table if missing, add columns new to the schema, create indexes
    pub async fn ensure(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query(&self.create_table_sql()).execute(pool).await?;

        let added = SchemaSync::sync_columns(pool, self.table, &self.expected_columns()).await?;
        if !added.is_empty() {
            info!("Table '{}' gained columns: {}", self.table, added.join(", "));
        }

        for sql in self.index_sql() {
            sqlx::query(&sql).execute(pool).await?;
        }
        Ok(())
    }

    pub async fn drop_table(&self, pool: &SqlitePool) -> Result<()> {
        sqlx::query(&format!("DROP TABLE IF EXISTS {}", self.table))
            .execute(pool)
            .await?;
        Ok(())
    }

    fn check_schema(&self, record: &Record) -> Result<()> {
        if std::ptr::eq(record.schema(), self.schema) {
            Ok(())
        } else {
            Err(Error::InvalidInput(format!(
                "{} record cannot be stored in table '{}'",
                record.schema().name,
                self.table
            )))
        }
    }

    /// Insert the record, or update the row with the same key
    pub async fn upsert(&self, pool: &SqlitePool, record: &Record) -> Result<()> {
        self.check_schema(record)?;
        let key = record.display_of(self.key_column).unwrap_or_default();
        if key.is_empty() {
            return Err(Error::InvalidInput(format!(
                "{} record has an empty {}",
                self.schema.name, self.key_column
            )));
        }

        let names = self.schema.field_names();
        let placeholders = vec!["?"; names.len()].join(", ");
        let updates = names
            .iter()
            .filter(|name| **name != self.key_column)
            .map(|name| format!("{name} = excluded.{name}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT({}) DO UPDATE SET {}",
            self.table,
            names.join(", "),
            placeholders,
            self.key_column,
            updates
        );

        let query = record
            .fields()
            .fold(sqlx::query(&sql), |query, (_, value)| SqlValue::from_value(value).bind_to(query));
        query.execute(pool).await?;

        debug!("Saved {} '{}' to {}", self.key_column, key, self.table);
        Ok(())
    }

    pub async fn fetch_by_key(&self, pool: &SqlitePool, key: &str) -> Result<Option<Record>> {
        let sql = format!(
            "SELECT * FROM {} WHERE {} = ?",
            self.table, self.key_column
        );
        let row = sqlx::query(&sql).bind(key).fetch_optional(pool).await?;
        row.map(|r| self.decode_row(&r)).transpose()
    }

    /// Every row, ordered by `order_by` (the id column or a schema field)
    pub async fn fetch_all(&self, pool: &SqlitePool, order_by: &str) -> Result<Vec<Record>> {
        if order_by != self.id_column && self.schema.index_of(order_by).is_none() {
            return Err(Error::InvalidInput(format!(
                "cannot order {} by unknown column '{}'",
                self.table, order_by
            )));
        }
        let sql = format!("SELECT * FROM {} ORDER BY {}", self.table, order_by);
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        rows.iter().map(|row| self.decode_row(row)).collect()
    }

    /// Decode every row separately, pairing each outcome with the row id
    pub async fn check_all(&self, pool: &SqlitePool) -> Result<Vec<(i64, Result<Record>)>> {
        let sql = format!("SELECT * FROM {} ORDER BY {}", self.table, self.id_column);
        let rows = sqlx::query(&sql).fetch_all(pool).await?;
        rows.iter()
            .map(|row| Ok((row.try_get::<i64, _>(self.id_column)?, self.decode_row(row))))
            .collect()
    }

    /// Validate `value` for `field` and write it into the row with `key`
    ///
    /// Returns false when no row has that key.
    pub async fn update_field(
        &self,
        pool: &SqlitePool,
        key: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<bool> {
        let mut probe = Record::new(self.schema)?;
        probe.set(field, value)?;
        let stored = probe
            .value_of(field)
            .map(SqlValue::from_value)
            .unwrap_or(SqlValue::Null);

        let sql = format!(
            "UPDATE {} SET {} = ? WHERE {} = ?",
            self.table, field, self.key_column
        );
        let result = stored
            .bind_to(sqlx::query(&sql))
            .bind(key)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Rebuild a record from a row; columns outside the schema are ignored
    pub fn decode_row(&self, row: &SqliteRow) -> Result<Record> {
        let mut pairs = Vec::with_capacity(self.schema.fields.len());
        for field in self.schema.fields {
            // Keyword lists come back as comma-joined text and split again on construction
            pairs.push((field.name, decode_column(row, field.name)?.into_value()));
        }
        Ok(Record::construct(self.schema, pairs)?)
    }
}

fn decode_column(row: &SqliteRow, name: &str) -> Result<SqlValue> {
    let raw = row.try_get_raw(name)?;
    if raw.is_null() {
        return Ok(SqlValue::Null);
    }
    let storage = raw.type_info().name().to_string();

    let value = match storage.as_str() {
        "INTEGER" | "BOOLEAN" => SqlValue::Integer(row.try_get_unchecked::<i64, _>(name)?),
        "REAL" => SqlValue::Text(row.try_get_unchecked::<f64, _>(name)?.to_string()),
        _ => SqlValue::Text(row.try_get_unchecked::<String, _>(name)?),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    static TAKES: Schema = Schema::new(
        "takes",
        &[
            FieldDef::bounded("take", 16),
            FieldDef::unsigned("seconds"),
            FieldDef::ranged("rating", 0, 5).nullable(),
            FieldDef::date("loaded_on"),
            FieldDef::keywords("tags"),
        ],
    );

    static TAKES_TABLE: TableLayout = TableLayout {
        table: "takes",
        id_column: "take_id",
        schema: &TAKES,
        key_column: "take",
        indexes: &[
            IndexDef::unique("idx_take", &["take"]),
            IndexDef::new("idx_loaded_on", &["loaded_on"]),
        ],
    };

    async fn setup() -> SqlitePool {
        let pool = open_in_memory().await.unwrap();
        TAKES_TABLE.ensure(&pool).await.unwrap();
        pool
    }

    #[test]
    fn test_create_sql() {
        let sql = TAKES_TABLE.create_table_sql();
        assert!(sql.starts_with("CREATE TABLE IF NOT EXISTS takes"));
        assert!(sql.contains("take_id INTEGER PRIMARY KEY"));
        assert!(sql.contains("seconds INTEGER"));
        assert!(sql.contains("take TEXT DEFAULT ''"));
        assert_eq!(
            TAKES_TABLE.index_sql()[0],
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_take ON takes (take)"
        );
    }

    #[test]
    fn test_storage_values() {
        let date = chrono::NaiveDate::from_ymd_opt(1984, 1, 2).unwrap();
        assert_eq!(SqlValue::from_value(&Value::Date(date)), SqlValue::Text(String::new()));
        assert_eq!(SqlValue::from_value(&Value::Bool(true)), SqlValue::Integer(1));
        assert_eq!(
            SqlValue::from_value(&Value::List(vec!["a".into(), "b".into()])),
            SqlValue::Text("a, b".into())
        );
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let pool = setup().await;
        let record = Record::construct(
            &TAKES,
            vec![
                ("take", "T1"),
                ("seconds", "95"),
                ("loaded_on", "2009-03-04"),
                ("tags", "live, remastered"),
            ],
        )
        .unwrap();

        TAKES_TABLE.upsert(&pool, &record).await.unwrap();
        let loaded = TAKES_TABLE.fetch_by_key(&pool, "T1").await.unwrap().unwrap();
        assert_eq!(loaded, record);
        assert!(TAKES_TABLE.fetch_by_key(&pool, "T2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_upsert_keeps_id() {
        let pool = setup().await;
        let mut record = Record::construct(&TAKES, vec![("take", "T1")]).unwrap();
        TAKES_TABLE.upsert(&pool, &record).await.unwrap();
        record.set("seconds", 12i64).unwrap();
        TAKES_TABLE.upsert(&pool, &record).await.unwrap();

        let (count, id): (i64, i64) = sqlx::query_as("SELECT COUNT(*), MAX(take_id) FROM takes")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!((count, id), (1, 1));

        let all = TAKES_TABLE.fetch_all(&pool, "take_id").await.unwrap();
        assert_eq!(all[0].int_of("seconds"), Some(12));
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let pool = setup().await;
        let record = Record::new(&TAKES).unwrap();
        assert!(matches!(
            TAKES_TABLE.upsert(&pool, &record).await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_update_field_validates() {
        let pool = setup().await;
        let record = Record::construct(&TAKES, vec![("take", "T1")]).unwrap();
        TAKES_TABLE.upsert(&pool, &record).await.unwrap();

        assert!(TAKES_TABLE.update_field(&pool, "T1", "rating", 4i64).await.unwrap());
        assert!(!TAKES_TABLE.update_field(&pool, "T9", "rating", 4i64).await.unwrap());
        assert!(matches!(
            TAKES_TABLE.update_field(&pool, "T1", "rating", 9i64).await,
            Err(Error::Record(_))
        ));

        let loaded = TAKES_TABLE.fetch_by_key(&pool, "T1").await.unwrap().unwrap();
        assert_eq!(loaded.int_of("rating"), Some(4));
    }

    #[tokio::test]
    async fn test_stored_garbage_is_rejected_on_load() {
        let pool = setup().await;
        sqlx::query("INSERT INTO takes (take, seconds) VALUES ('T1', -4)")
            .execute(&pool)
            .await
            .unwrap();

        assert!(matches!(
            TAKES_TABLE.fetch_by_key(&pool, "T1").await,
            Err(Error::Record(_))
        ));

        let good = Record::construct(&TAKES, vec![("take", "T2")]).unwrap();
        TAKES_TABLE.upsert(&pool, &good).await.unwrap();
        let checked = TAKES_TABLE.check_all(&pool).await.unwrap();
        assert_eq!(checked.len(), 2);
        assert_eq!(checked[0].0, 1);
        assert!(checked[0].1.is_err());
        assert!(checked[1].1.is_ok());
    }

    #[tokio::test]
    async fn test_fetch_all_rejects_unknown_order() {
        let pool = setup().await;
        assert!(TAKES_TABLE.fetch_all(&pool, "take; DROP TABLE takes").await.is_err());
    }
}
