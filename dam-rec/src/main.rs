//! dam-rec - recording projects log and file tagging

use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use dam_common::config::TomlConfig;
use dam_common::db::{init_database, recordings};
use dam_common::logging::init_logging;
use dam_common::shell::RunMode;
use dam_rec::cli::{Cli, Command};
use dam_rec::tasks;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!(
        "Starting dam-rec v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    match cli.command {
        // any file, not the recordings database
        Command::DumpSqlite { file } => {
            println!("{}", tasks::dump_sqlite(&file).await?);
            Ok(())
        }
        command => run_on_recordings(command, cli.db.as_deref()).await,
    }
}

async fn run_on_recordings(command: Command, db: Option<&Path>) -> Result<()> {
    let config = TomlConfig::load();

    let db_path = config.resolve_recordings_db(db);
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path)
        .await
        .with_context(|| format!("Failed to open {}", db_path.display()))?;
    recordings::ensure_schema(&pool).await?;

    match command {
        Command::CreateDb => {
            info!("Recordings table ready");
        }
        Command::Import { file } => {
            tasks::import(&pool, &file).await?;
        }
        Command::Export { file } => {
            tasks::export(&pool, &file).await?;
        }
        Command::Dump => {
            println!("{}", tasks::dump(&pool).await?);
        }
        Command::DumpSqlite { file } => {
            println!("{}", tasks::dump_sqlite(&file).await?);
        }
        Command::Check => {
            let invalid = tasks::check(&pool).await?;
            if invalid > 0 {
                anyhow::bail!("{} invalid recordings", invalid);
            }
        }
        Command::LoadDates { folder } => {
            let tally = tasks::load_dates(&pool, &folder).await?;
            info!("Set {} load dates, skipped {}", tally.done, tally.skipped);
        }
        Command::BextDescriptions { file } => {
            let tally = tasks::bext_descriptions(&pool, &file).await?;
            info!("Set {} descriptions, skipped {}", tally.done, tally.skipped);
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
