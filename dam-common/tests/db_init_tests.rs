//! Database files across reopen and upgrade

use dam_common::db::schema_sync::SchemaIntrospector;
use dam_common::db::{init_database, music, recordings};
use dam_common::schemas::{PDF_META, RECORDING};
use dam_common::Record;
use tempfile::TempDir;

fn recording() -> Record {
    Record::construct(
        &RECORDING,
        vec![
            ("tape", "Bands 91"),
            ("recorded_on", "1991-05-11 22:00"),
            ("medium", "DAT"),
            ("session", "Caltech Bands 1991-05-11"),
            ("notes", "  second reel  "),
            ("performers", "Caltech Jazz Band"),
        ],
    )
    .unwrap()
}

#[tokio::test]
async fn test_records_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("recording_projects.db");

    let pool = init_database(&path).await.unwrap();
    recordings::ensure_schema(&pool).await.unwrap();
    recordings::save_recording(&pool, &recording()).await.unwrap();
    pool.close().await;

    let pool = init_database(&path).await.unwrap();
    recordings::ensure_schema(&pool).await.unwrap();
    let loaded = recordings::load_by_session(&pool, "Caltech Bands 1991-05-11")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded, recording());
    assert_eq!(loaded.str_of("notes"), Some("second reel"));
}

#[tokio::test]
async fn test_older_recordings_table_is_upgraded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("recording_projects.db");
    let pool = init_database(&path).await.unwrap();

    // layout from before `title` was added
    sqlx::query(
        "CREATE TABLE main (main_id INTEGER PRIMARY KEY, tape TEXT, location TEXT, \
         recorded_on TEXT, reference TEXT, medium TEXT, encoding TEXT, loaded_on TEXT, \
         session TEXT, notes TEXT, edited_on TEXT, uploaded_on TEXT, description TEXT, \
         performers TEXT)",
    )
    .execute(&pool)
    .await
    .unwrap();
    sqlx::query("INSERT INTO main (tape, session, recorded_on) VALUES ('Glee 88', 'Glee', '1988-02-20 19:30:00')")
        .execute(&pool)
        .await
        .unwrap();

    recordings::ensure_schema(&pool).await.unwrap();

    let columns = SchemaIntrospector::introspect_table(&pool, "main").await.unwrap();
    assert!(columns.iter().any(|c| c.name == "title"));

    let glee = recordings::load_by_session(&pool, "Glee").await.unwrap().unwrap();
    assert_eq!(glee.str_of("title"), Some(""));
    assert_eq!(glee.display_of("recorded_on").as_deref(), Some("1988-02-20 19:30"));
}

#[tokio::test]
async fn test_music_reset_discards_rows() {
    let dir = TempDir::new().unwrap();
    let pool = init_database(&dir.path().join("music.sqlite")).await.unwrap();
    music::ensure_schema(&pool).await.unwrap();

    let meta = Record::construct(&PDF_META, vec![("filename", "a.pdf"), ("rating", "3")]).unwrap();
    music::save_meta(&pool, &meta).await.unwrap();
    assert!(music::load_by_filename(&pool, "a.pdf").await.unwrap().is_some());

    music::reset(&pool).await.unwrap();
    assert!(music::load_by_filename(&pool, "a.pdf").await.unwrap().is_none());
}
