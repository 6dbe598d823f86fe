//! Sheet music metadata: the `meta` table of `music.sqlite`

use sqlx::SqlitePool;
use tracing::info;

use super::table::{IndexDef, TableLayout};
use crate::record::Record;
use crate::schemas::PDF_META;
use crate::Result;

pub static MUSIC_TABLE: TableLayout = TableLayout {
    table: "meta",
    id_column: "meta_id",
    schema: &PDF_META,
    key_column: "filename",
    indexes: &[
        IndexDef::unique("idx_filename", &["filename"]),
        IndexDef::new("idx_title", &["title"]),
        IndexDef::new("idx_author", &["author"]),
        IndexDef::new("idx_subject", &["subject"]),
        IndexDef::new("idx_keywords", &["keywords"]),
    ],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MusicOrder {
    #[default]
    Id,
    Filename,
}

pub async fn ensure_schema(pool: &SqlitePool) -> Result<()> {
    MUSIC_TABLE.ensure(pool).await
}

/// Drop and recreate the table, discarding every row
pub async fn reset(pool: &SqlitePool) -> Result<()> {
    MUSIC_TABLE.drop_table(pool).await?;
    MUSIC_TABLE.ensure(pool).await?;
    info!("Reset table '{}'", MUSIC_TABLE.table);
    Ok(())
}

pub async fn save_meta(pool: &SqlitePool, meta: &Record) -> Result<()> {
    MUSIC_TABLE.upsert(pool, meta).await
}

pub async fn load_by_filename(pool: &SqlitePool, filename: &str) -> Result<Option<Record>> {
    MUSIC_TABLE.fetch_by_key(pool, filename).await
}

pub async fn load_all(pool: &SqlitePool, order: MusicOrder) -> Result<Vec<Record>> {
    let column = match order {
        MusicOrder::Id => MUSIC_TABLE.id_column,
        MusicOrder::Filename => MUSIC_TABLE.key_column,
    };
    MUSIC_TABLE.fetch_all(pool, column).await
}
