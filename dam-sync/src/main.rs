//! dam-sync - CMS tree synchronization over rsync

use anyhow::{Context, Result};
use clap::Parser;
use dam_common::config::TomlConfig;
use dam_common::logging::init_logging;
use dam_common::shell::{confirm, RunMode, Runner};
use dam_sync::cli::Cli;
use dam_sync::settings::load_project_overrides;
use dam_sync::SyncPlan;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    info!(
        "Starting dam-sync v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let cli = Cli::parse();
    let config = TomlConfig::load();

    let dev = match &cli.dev {
        Some(dev) => dev.clone(),
        None => std::env::current_dir().context("Cannot determine the current directory")?,
    };
    let dev = dev
        .canonicalize()
        .with_context(|| format!("\"{}\" does not exist", dev.display()))?;

    let mut settings = config.sync;
    if let Some(project) = load_project_overrides(&dev)? {
        settings = project.apply(settings);
    }
    settings = cli.overrides().apply(settings);

    let plan = SyncPlan::new(
        cli.direction,
        &dev,
        cli.subpath.as_deref(),
        cli.options(),
        settings,
    )?;
    plan.check_paths()?;

    // Always show what would run
    print!("{}", plan.filters());
    println!("{}", plan.command_line());

    if !(cli.yes || confirm("Continue?")?) {
        println!("Canceled.");
        return Ok(());
    }

    let mut runner = Runner::new(RunMode::Execute);
    if !runner.run(&plan.shell_command()).await? {
        anyhow::bail!("rsync failed");
    }
    info!("Synchronized {}", dev.display());
    Ok(())
}
