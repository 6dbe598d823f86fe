//! End-to-end tests for the recording log tasks against a file database

use std::path::Path;

use dam_common::db::{init_database, recordings};
use dam_common::shell::RunMode;
use dam_rec::tasks;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode};
use sqlx::SqlitePool;
use tempfile::TempDir;

const LOG_CSV: &str = "\
main_id,tape,location,recorded_on,reference,medium,encoding,session,notes,title,description,performers
1,Bands 91,Beckman Auditorium,1991-05-11 22:00,USRAWPCMF1801180,DAT,PCM,Caltech Bands 1991-05-11,,,Spring concert,Caltech Jazz Band
2,Glee 88,Dabney Lounge,1988-02-20 19:30,,VHS,FM,Glee Club 1988-02-20,first tape,,,Glee Club
3,Broken,,1990-01-01,,BETAMAX-HIFI,,broken session,,,,
";

async fn setup(dir: &TempDir) -> SqlitePool {
    let pool = init_database(&dir.path().join("recording_projects.db")).await.unwrap();
    recordings::ensure_schema(&pool).await.unwrap();
    pool
}

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[tokio::test]
async fn test_import_skips_bad_rows() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    let csv = write(&dir, "log.csv", LOG_CSV);

    let tally = tasks::import(&pool, &csv).await.unwrap();
    assert_eq!((tally.done, tally.skipped), (2, 1));

    let glee = recordings::load_by_session(&pool, "Glee Club 1988-02-20")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(glee.display_of("recorded_on").as_deref(), Some("1988-02-20 19:30"));
    assert_eq!(glee.str_of("notes"), Some("first tape"));
}

#[tokio::test]
async fn test_export_then_import_reproduces_log() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::import(&pool, &write(&dir, "log.csv", LOG_CSV)).await.unwrap();
    let before = recordings::load_all(&pool).await.unwrap();

    let tsv = dir.path().join("out").join("log.tsv");
    assert_eq!(tasks::export(&pool, &tsv).await.unwrap(), 2);

    let other = TempDir::new().unwrap();
    let fresh = setup(&other).await;
    tasks::import(&fresh, &tsv).await.unwrap();
    assert_eq!(recordings::load_all(&fresh).await.unwrap(), before);
}

#[tokio::test]
async fn test_export_empty_log_fails() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    assert!(tasks::export(&pool, &dir.path().join("log.csv")).await.is_err());
}

#[tokio::test]
async fn test_dump_and_check() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::import(&pool, &write(&dir, "log.csv", LOG_CSV)).await.unwrap();

    let json: serde_json::Value = serde_json::from_str(&tasks::dump(&pool).await.unwrap()).unwrap();
    assert_eq!(json[0]["tape"], "Bands 91");
    assert_eq!(json[0]["loaded_on"], "");
    assert_eq!(tasks::check(&pool).await.unwrap(), 0);

    sqlx::query("UPDATE main SET medium = 'BETAMAX-HIFI' WHERE main_id = 2")
        .execute(&pool)
        .await
        .unwrap();
    assert_eq!(tasks::check(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_bext_descriptions() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::import(&pool, &write(&dir, "log.csv", LOG_CSV)).await.unwrap();

    let lines = write(
        &dir,
        "bext.txt",
        "bexttool -Originator 'Reid W.' -Description 'Glee Club winter concert' Glee\\ Club\\ 1988-02-20.wav\n\
         \n\
         bexttool -Description 'Nobody' Unknown.wav\n",
    );
    let tally = tasks::bext_descriptions(&pool, &lines).await.unwrap();
    assert_eq!((tally.done, tally.skipped), (1, 1));

    let glee = recordings::load_by_session(&pool, "Glee Club 1988-02-20")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(glee.str_of("description"), Some("Glee Club winter concert"));
}

#[tokio::test]
async fn test_load_dates_from_session_files() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::import(&pool, &write(&dir, "log.csv", LOG_CSV)).await.unwrap();

    let sessions = dir.path().join("sessions").join("Caltech Bands 1991-05-11");
    std::fs::create_dir_all(&sessions).unwrap();
    std::fs::write(sessions.join("Caltech Bands 1991-05-11.ptf"), b"").unwrap();
    std::fs::write(sessions.join("Not Logged.ptf"), b"").unwrap();

    let tally = tasks::load_dates(&pool, &dir.path().join("sessions")).await.unwrap();
    assert_eq!((tally.done, tally.skipped), (1, 1));

    let bands = recordings::load_by_session(&pool, "Caltech Bands 1991-05-11")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(
        bands.display_of("loaded_on"),
        Some(chrono::Local::now().date_naive().format("%Y-%m-%d").to_string())
    );
}

#[tokio::test]
async fn test_apply_prints_commands() {
    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::import(&pool, &write(&dir, "log.csv", LOG_CSV)).await.unwrap();

    let files = vec![
        write(&dir, "Caltech Bands 1991-05-11.wav", ""),
        write(&dir, "Caltech Bands 1991-05-11.doc", ""),
        write(&dir, "Unknown.pdf", ""),
        Path::new("/does/not/exist.wav").to_path_buf(),
    ];
    let tally = tasks::apply(&pool, &files, "Jane Doe", RunMode::Print).await.unwrap();
    assert_eq!((tally.done, tally.skipped), (1, 3));
}

#[cfg(unix)]
#[tokio::test]
async fn test_apply_touches_text_file() {
    use std::time::UNIX_EPOCH;

    let dir = TempDir::new().unwrap();
    let pool = setup(&dir).await;
    tasks::import(&pool, &write(&dir, "log.csv", LOG_CSV)).await.unwrap();

    let notes = write(&dir, "Glee Club 1988-02-20.txt", "notes");
    let tally = tasks::apply(&pool, &[notes.clone()], "Jane Doe", RunMode::Execute)
        .await
        .unwrap();
    assert_eq!(tally.done, 1);

    let modified = std::fs::metadata(&notes).unwrap().modified().unwrap();
    let local = chrono::DateTime::<chrono::Local>::from(modified);
    assert_eq!(local.format("%Y-%m-%d %H:%M").to_string(), "1988-02-20 19:30");
    assert!(modified > UNIX_EPOCH);
}

#[tokio::test]
async fn test_dump_sqlite_reads_any_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("other.sqlite");
    let options = SqliteConnectOptions::new()
        .filename(&path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Delete);
    let pool = SqlitePool::connect_with(options).await.unwrap();
    sqlx::query("CREATE TABLE takes (id INTEGER PRIMARY KEY, name TEXT, gain REAL, peaks BLOB, note TEXT)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("CREATE TABLE \"empty table\" (x INTEGER)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO takes (name, gain, peaks, note) VALUES ('Take 1', -3.5, x'00ff', NULL)")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let json: serde_json::Value =
        serde_json::from_str(&tasks::dump_sqlite(&path).await.unwrap()).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "empty table": [],
            "takes": [{"id": 1, "name": "Take 1", "gain": -3.5, "peaks": "00ff", "note": null}],
        })
    );

    let keys: Vec<&String> = json["takes"][0].as_object().unwrap().keys().collect();
    assert_eq!(keys, ["id", "name", "gain", "peaks", "note"]);
}

#[tokio::test]
async fn test_dump_sqlite_never_creates_a_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.sqlite");

    let err = tasks::dump_sqlite(&path).await.unwrap_err();
    assert!(matches!(
        err.downcast_ref::<dam_common::Error>(),
        Some(dam_common::Error::NotFound(_))
    ));
    assert!(!path.exists());
}
