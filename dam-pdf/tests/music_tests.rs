//! End-to-end tests for the sheet music tasks against a file database

use dam_common::db::music::{self, MusicOrder};
use dam_common::db::init_database;
use dam_common::shell::RunMode;
use dam_pdf::tasks;
use sqlx::SqlitePool;
use tempfile::TempDir;

const SHEET_TSV: &str = "\
File Name\tTitle\tComposer\tEnsemble\tKeywords\tArranger\tKey\tDuration\tRating
toccata.pdf\tToccata and Fugue\tBach, J.S.\tOrgan\tbaroque\t\td\t9:05\t4
air.pdf\tAir\tBach, J.S.\tStrings\tbaroque, slow\tA. Person\tD\t\t
broken.pdf\tBroken\t\t\t\t\tH\t\t
\tNo file\t\t\t\t\t\t\t
";

async fn setup(dir: &TempDir) -> SqlitePool {
    let pool = init_database(&dir.path().join("music.sqlite")).await.unwrap();
    music::ensure_schema(&pool).await.unwrap();
    pool
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_load_sheet() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;

    let tally = tasks::load(&pool, &write(&dir, "sheet.tsv", SHEET_TSV)).await.unwrap();
    assert_eq!((tally.done, tally.skipped), (2, 2));

    let toccata = music::load_by_filename(&pool, "toccata.pdf").await.unwrap().unwrap();
    assert_eq!(toccata.str_of("author"), Some("Bach, J.S."));
    assert_eq!(
        toccata.str_of("keywords"),
        Some("baroque, keysf:-1, keymi:1, duration:545, rating:4")
    );
}

#[tokio::test]
async fn test_load_replaces_same_file() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::load(&pool, &write(&dir, "sheet.tsv", SHEET_TSV)).await.unwrap();

    let update = write(&dir, "update.csv", "filename,title\nair.pdf,Air on the G String\n");
    tasks::load(&pool, &update).await.unwrap();

    let rows = music::load_all(&pool, MusicOrder::Id).await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].str_of("title"), Some("Air on the G String"));
}

#[tokio::test]
async fn test_export_then_load_reproduces_table() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::load(&pool, &write(&dir, "sheet.tsv", SHEET_TSV)).await.unwrap();
    sqlx::query("UPDATE meta SET rating = 5, keysf = -3 WHERE filename = 'air.pdf'")
        .execute(&pool)
        .await
        .unwrap();
    let before = music::load_all(&pool, MusicOrder::Id).await.unwrap();

    let csv = dir.path().join("meta.csv");
    assert_eq!(tasks::export(&pool, &csv).await.unwrap(), 2);

    let other = TempDir::new().unwrap();
    let fresh = setup(&other).await;
    tasks::load(&fresh, &csv).await.unwrap();
    assert_eq!(music::load_all(&fresh, MusicOrder::Id).await.unwrap(), before);
}

#[tokio::test]
async fn test_export_empty_table_fails() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    assert!(tasks::export(&pool, &dir.path().join("meta.tsv")).await.is_err());
}

#[tokio::test]
async fn test_forscore_export() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::load(&pool, &write(&dir, "sheet.tsv", SHEET_TSV)).await.unwrap();

    let out = dir.path().join("4sMeta.csv");
    assert_eq!(tasks::forscore(&pool, &out).await.unwrap(), 2);

    let text = std::fs::read_to_string(&out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("Filename,Title,Start Page (Bookmark)"));
    // sorted by file name
    assert_eq!(
        lines[1],
        "air.pdf,Air,,,\"Bach, J.S.\",Strings,\"baroque, slow\",,A. Person,0,0,,,2,0"
    );
    assert_eq!(
        lines[2],
        "toccata.pdf,Toccata and Fugue,,,\"Bach, J.S.\",Organ,baroque,,,4,0,9,5,-1,1"
    );
}

#[tokio::test]
async fn test_apply_prints_commands() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::load(&pool, &write(&dir, "sheet.tsv", SHEET_TSV)).await.unwrap();

    let files = vec![
        write(&dir, "air.pdf", ""),
        write(&dir, "unknown.pdf", ""),
        dir.path().join("missing.pdf"),
    ];
    let tally = tasks::apply(&pool, &files, "Jane Doe", RunMode::Print).await.unwrap();
    assert_eq!((tally.done, tally.skipped), (1, 2));
}
