//! Recording log operations behind the `dam-rec` subcommands

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Local};
use dam_common::db::{dump, recordings};
use dam_common::escape::split_shell_words;
use dam_common::schemas::RECORDING;
use dam_common::shell::{RunMode, Runner};
use dam_common::tabular;
use sqlx::SqlitePool;
use tracing::{error, info, warn};
use walkdir::WalkDir;

use crate::apply::{commands_for, session_of, Skip};

/// Folder ProTools keeps automatic session backups in
const BACKUP_FOLDER: &str = "Session File Backups";

/// Counts reported at the end of a batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub done: usize,
    pub skipped: usize,
}

/// Load a CSV/TSV export of the recording log; bad rows are logged and skipped
pub async fn import(pool: &SqlitePool, file: &Path) -> Result<Tally> {
    let rows = tabular::read_records(file, &RECORDING)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut tally = Tally::default();
    for row in rows {
        let saved = match row.record {
            Ok(record) => recordings::save_recording(pool, &record).await,
            Err(e) => Err(e),
        };
        match saved {
            Ok(()) => tally.done += 1,
            Err(e) => {
                warn!("{}:{}: {}", file.display(), row.line, e);
                tally.skipped += 1;
            }
        }
    }
    info!("Imported {} recordings, skipped {}", tally.done, tally.skipped);
    Ok(tally)
}

/// Write the whole log in insertion order; an empty log is an error
pub async fn export(pool: &SqlitePool, file: &Path) -> Result<usize> {
    let records = recordings::load_all(pool).await?;
    if records.is_empty() {
        bail!("No recordings found");
    }
    let count = tabular::write_records(file, &RECORDING, &records)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    info!("Exported {} recordings to {}", count, file.display());
    Ok(count)
}

/// The whole log as a JSON array
pub async fn dump(pool: &SqlitePool) -> Result<String> {
    let records = recordings::load_all(pool).await?;
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Every table of any SQLite file as a JSON object keyed by table name
pub async fn dump_sqlite(file: &Path) -> Result<String> {
    let pool = dump::open_read_only(file)
        .await
        .with_context(|| format!("Failed to open {}", file.display()))?;
    let tables = dump::dump_database(&pool).await?;
    pool.close().await;
    info!("Dumped {} tables from {}", tables.len(), file.display());
    Ok(serde_json::to_string_pretty(&tables)?)
}

/// Re-validate every stored row; returns the number of invalid rows
pub async fn check(pool: &SqlitePool) -> Result<usize> {
    let rows = recordings::RECORDINGS_TABLE.check_all(pool).await?;
    let mut invalid = 0;
    for (id, result) in &rows {
        if let Err(e) = result {
            error!("Row {}: {}", id, e);
            invalid += 1;
        }
    }
    info!("Checked {} recordings, {} invalid", rows.len(), invalid);
    Ok(invalid)
}

/// ProTools session files under `root`, skipping automatic backups
pub fn session_files(root: &Path) -> Vec<PathBuf> {
    WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| e.file_name() != BACKUP_FOLDER)
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Error accessing entry: {}", e);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "ptf"))
        .collect()
}

/// Set each session's `loaded_on` to its session file's modification date
pub async fn load_dates(pool: &SqlitePool, root: &Path) -> Result<Tally> {
    let mut tally = Tally::default();
    for file in session_files(root) {
        let Some(session) = session_of(&file) else {
            continue;
        };
        let modified = std::fs::metadata(&file)
            .and_then(|m| m.modified())
            .with_context(|| format!("Failed to stat {}", file.display()))?;
        let loaded_on = DateTime::<Local>::from(modified).date_naive();

        match recordings::set_loaded_on(pool, session, loaded_on).await {
            Ok(true) => tally.done += 1,
            Ok(false) => {
                info!("{} - {} (no such session)", session, loaded_on);
                tally.skipped += 1;
            }
            Err(e) => {
                warn!("{}: {}", session, e);
                tally.skipped += 1;
            }
        }
    }
    Ok(tally)
}

/// Session and description from one saved `bexttool` command line
///
/// Options are `-Name value` pairs between the program and the file name.
pub fn parse_bext_line(line: &str) -> Result<Option<(String, Option<String>)>> {
    let words = split_shell_words(line)?;
    if words.len() < 2 {
        return Ok(None);
    }
    let (file, options) = words[1..].split_last().context("empty command")?;

    let mut description = None;
    let mut i = 0;
    while i < options.len() {
        if let Some(name) = options[i].strip_prefix('-') {
            if name == "Description" {
                description = options.get(i + 1).cloned();
            }
            i += 2;
        } else {
            i += 1;
        }
    }

    let session = Path::new(file)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    Ok(Some((session, description)))
}

/// Copy descriptions out of a file of saved `bexttool` command lines
pub async fn bext_descriptions(pool: &SqlitePool, file: &Path) -> Result<Tally> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut tally = Tally::default();
    for (n, line) in text.lines().enumerate().filter(|(_, l)| !l.trim().is_empty()) {
        let parsed = match parse_bext_line(line) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("{}:{}: {}", file.display(), n + 1, e);
                tally.skipped += 1;
                continue;
            }
        };
        let Some((session, Some(description))) = parsed else {
            tally.skipped += 1;
            continue;
        };
        match recordings::set_description(pool, &session, &description).await {
            Ok(true) => tally.done += 1,
            Ok(false) => {
                info!("No recording for session {}", session);
                tally.skipped += 1;
            }
            Err(e) => {
                warn!("{}: {}", session, e);
                tally.skipped += 1;
            }
        }
    }
    Ok(tally)
}

/// Tag each file with the metadata of its recording session
pub async fn apply(
    pool: &SqlitePool,
    files: &[PathBuf],
    creator: &str,
    mode: RunMode,
) -> Result<Tally> {
    let mut runner = Runner::new(mode);
    let mut tally = Tally::default();

    for file in files {
        if !file.is_file() {
            info!("{} not good", file.display());
            tally.skipped += 1;
            continue;
        }
        let Some(session) = session_of(file) else {
            tally.skipped += 1;
            continue;
        };
        let Some(recording) = recordings::load_by_session(pool, session).await? else {
            info!("No project record found for {}", file.display());
            tally.skipped += 1;
            continue;
        };

        let commands = match commands_for(file, &recording, creator) {
            Ok(commands) => commands,
            Err(Skip::UnknownExtension) => {
                info!("Nothing to do for {}", file.display());
                tally.skipped += 1;
                continue;
            }
            Err(Skip::NoRecordingDate) => {
                warn!("Recording {} has no recording date", session);
                tally.skipped += 1;
                continue;
            }
        };

        info!("Processing {}", file.display());
        let mut ok = true;
        for command in &commands {
            ok &= runner.run(command).await?;
        }
        if ok {
            tally.done += 1;
        } else {
            tally.skipped += 1;
        }
    }
    Ok(tally)
}
