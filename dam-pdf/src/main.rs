//! dam-pdf - sheet music PDF metadata

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use dam_common::config::TomlConfig;
use dam_common::db::{init_database, music};
use dam_common::logging::init_logging;
use dam_common::shell::{confirm, RunMode};
use dam_pdf::cli::{Cli, Command};
use dam_pdf::tasks;
use tracing::info;

/// forScore import file, relative to the home directory
const FORSCORE_FILE: &str = "Desktop/4sMeta.csv";

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!(
        "Starting dam-pdf v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let config = TomlConfig::load();

    let db_path = config.resolve_music_db(cli.db.as_deref());
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open {}", db_path.display()))?;
    music::ensure_schema(&pool).await?;

    match cli.command {
        Command::ResetDb { yes } => {
            println!("WARNING: This deletes every metadata row.");
            if yes || confirm("Continue?")? {
                music::reset(&pool).await?;
            } else {
                info!("Aborted");
            }
        }
        Command::Load { reset, file } => {
            if reset {
                music::reset(&pool).await?;
            }
            tasks::load(&pool, &file).await?;
        }
        Command::Export { file } => {
            tasks::export(&pool, &file).await?;
        }
        Command::Forscore { file, yes } => {
            let file = match file {
                Some(file) => file,
                None => default_forscore_file()?,
            };
            let question = format!("File '{}' already exists. Overwrite?", file.display());
            if !file.exists() || yes || confirm(&question)? {
                tasks::forscore(&pool, &file).await?;
            } else {
                info!("Aborted");
            }
        }
        Command::Apply {
            print,
            creator,
            files,
        } => {
            let creator = config.resolve_creator(creator.as_deref()).context(
                "No creator name; pass --creator, set DAM_CREATOR or add creator to the config file",
            )?;
            let mode = if print { RunMode::Print } else { RunMode::Execute };
            let tally = tasks::apply(&pool, &files, &creator, mode).await?;
            info!("Tagged {} files, skipped {}", tally.done, tally.skipped);
        }
    }

    pool.close().await;
    Ok(())
}

fn default_forscore_file() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(FORSCORE_FILE))
        .context("Could not determine the home directory; pass a file name")
}
