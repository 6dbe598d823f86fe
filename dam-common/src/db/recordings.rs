//! Recording projects log: the `main` table of `recording_projects.db`
//!
//! One row per recording session, keyed by the session directory name.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use super::table::{IndexDef, TableLayout};
use crate::record::Record;
use crate::schemas::RECORDING;
use crate::Result;

pub static RECORDINGS_TABLE: TableLayout = TableLayout {
    table: "main",
    id_column: "main_id",
    schema: &RECORDING,
    key_column: "session",
    indexes: &[
        IndexDef::new("idx_tape_date", &["tape", "recorded_on"]),
        IndexDef::unique("idx_session", &["session"]),
        IndexDef::new("idx_recorded_on", &["recorded_on"]),
        IndexDef::new("idx_loaded_on", &["loaded_on"]),
        IndexDef::new("idx_upload_on", &["uploaded_on"]),
    ],
};

/// Create the table, or bring an older one up to date
pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    RECORDINGS_TABLE.ensure(pool).await
}

/// Insert a recording or replace the row with the same session
pub async fn save_recording(pool: &SqlitePool, recording: &Record) -> Result<()> {
    RECORDINGS_TABLE.upsert(pool, recording).await
}

pub async fn load_by_session(pool: &SqlitePool, session: &str) -> Result<Option<Record>> {
    RECORDINGS_TABLE.fetch_by_key(pool, session).await
}

/// All recordings in insertion order
pub async fn load_all(pool: &SqlitePool) -> Result<Vec<Record>> {
    RECORDINGS_TABLE.fetch_all(pool, RECORDINGS_TABLE.id_column).await
}

/// Returns false when the session is not in the log
pub async fn set_loaded_on(pool: &SqlitePool, session: &str, loaded_on: NaiveDate) -> Result<bool> {
    RECORDINGS_TABLE
        .update_field(pool, session, "loaded_on", loaded_on)
        .await
}

/// Returns false when the session is not in the log
pub async fn set_description(pool: &SqlitePool, session: &str, description: &str) -> Result<bool> {
    RECORDINGS_TABLE
        .update_field(pool, session, "description", description)
        .await
}
