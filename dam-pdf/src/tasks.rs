//! Sheet music database operations behind the `dam-pdf` subcommands

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use dam_common::db::music::{self, MusicOrder};
use dam_common::forscore::export_forscore;
use dam_common::schemas::PDF_META;
use dam_common::shell::{RunMode, Runner};
use dam_common::tabular;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::apply::{command_for, lookup_name};
use crate::sheet::meta_from_row;

/// Counts reported at the end of a batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Tally {
    pub done: usize,
    pub skipped: usize,
}

/// Load a CSV/TSV export of the spreadsheet or of the `meta` table
///
/// Rows replace earlier rows with the same file name. A row that fails
/// validation is logged and skipped.
pub async fn load(pool: &SqlitePool, file: &Path) -> Result<Tally> {
    let table = tabular::read_table(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let mut tally = Tally::default();
    for (line, cells) in &table.rows {
        let saved = match meta_from_row(table.pairs(cells)) {
            Ok(meta) if meta.str_of("filename").map_or(true, str::is_empty) => {
                tally.skipped += 1;
                continue;
            }
            Ok(meta) => music::save_meta(pool, &meta).await,
            Err(e) => Err(e),
        };
        match saved {
            Ok(()) => tally.done += 1,
            Err(e) => {
                warn!("{}:{}: {}", file.display(), line, e);
                tally.skipped += 1;
            }
        }
    }
    info!("Loaded {} rows, skipped {}", tally.done, tally.skipped);
    Ok(tally)
}

/// Write the whole table in insertion order; an empty table is an error
pub async fn export(pool: &SqlitePool, file: &Path) -> Result<usize> {
    let records = music::load_all(pool, MusicOrder::Id).await?;
    if records.is_empty() {
        bail!("No metadata rows found");
    }
    let count = tabular::write_records(file, &PDF_META, &records)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    info!("Exported {} rows to {}", count, file.display());
    Ok(count)
}

/// Write forScore's metadata import CSV, sorted by file name
pub async fn forscore(pool: &SqlitePool, file: &Path) -> Result<usize> {
    let records = music::load_all(pool, MusicOrder::Filename).await?;
    let count = export_forscore(file, &records)
        .with_context(|| format!("Failed to write {}", file.display()))?;
    info!("Exported {} rows to {}", count, file.display());
    Ok(count)
}

/// Write each PDF's metadata row into the file
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
            warn!("Not a file: {}", file.display());
            tally.skipped += 1;
            continue;
        }
        let Some(name) = lookup_name(file) else {
            tally.skipped += 1;
            continue;
        };
        let command = match music::load_by_filename(pool, name).await? {
            Some(meta) => command_for(file, &meta, creator),
            None => None,
        };
        let Some(command) = command else {
            info!("File has no meta data: {}", file.display());
            tally.skipped += 1;
            continue;
        };

        if runner.run(&command).await? {
            if mode == RunMode::Execute {
                info!("{} - done", name);
            }
            tally.done += 1;
        } else {
            tally.skipped += 1;
        }
    }
    Ok(tally)
}
