//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

use crate::plan::{Direction, SyncOptions};
use crate::settings::SyncOverrides;

/// Synchronize a CMS tree between a development directory and its servers
#[derive(Parser, Debug)]
#[command(name = "dam-sync")]
#[command(version, about, long_about = None)]
pub struct Cli {
    pub direction: Direction,

    /// Synchronize only this subtree, relative to the tree root
    pub subpath: Option<String>,

    /// Development tree (default: current directory)
    #[arg(long)]
    pub dev: Option<PathBuf>,

    /// Dry run showing which filter rule matched each file
    #[arg(short = 'd', long)]
    pub dry_run_debug: bool,

    /// Dry run listing every change
    #[arg(short, long)]
    pub itemize: bool,

    /// Show progress and transfer statistics
    #[arg(short, long)]
    pub stats: bool,

    /// Run without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Live server host; empty for a locally mounted tree
    #[arg(long)]
    pub live_server: Option<String>,

    /// Local testing server host
    #[arg(long)]
    pub local_server: Option<String>,

    /// CMS root on both servers
    #[arg(long)]
    pub server_path: Option<String>,

    /// rsync --bwlimit for live transfers; empty for none
    #[arg(long)]
    pub bwlimit: Option<String>,
}

impl Cli {
    pub fn options(&self) -> SyncOptions {
        SyncOptions {
            dry_run_debug: self.dry_run_debug,
            itemize: self.itemize,
            stats: self.stats,
        }
    }

    /// Settings given on the command line; they override every config file
    pub fn overrides(&self) -> SyncOverrides {
        SyncOverrides {
            live_server: self.live_server.clone(),
            local_server: self.local_server.clone(),
            server_path: self.server_path.clone(),
            bandwidth_limit: self.bwlimit.clone(),
            extra_filters: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_direction_spellings() {
        let cli = Cli::try_parse_from(["dam-sync", "dev-to-live", "custom"]).unwrap();
        assert_eq!(cli.direction, Direction::DevToLive);
        assert_eq!(cli.subpath.as_deref(), Some("custom"));

        let cli = Cli::try_parse_from(["dam-sync", "-di", "livetodev"]).unwrap();
        assert_eq!(cli.direction, Direction::LiveToDev);
        assert_eq!(
            cli.options(),
            SyncOptions {
                dry_run_debug: true,
                itemize: true,
                stats: false
            }
        );

        assert!(Cli::try_parse_from(["dam-sync", "sideways"]).is_err());
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "dam-sync",
            "--server-path",
            "/srv/crm",
            "--bwlimit",
            "2m",
            "dev-to-local",
        ])
        .unwrap();
        let overrides = cli.overrides();
        assert_eq!(overrides.server_path.as_deref(), Some("/srv/crm"));
        assert_eq!(overrides.bandwidth_limit.as_deref(), Some("2m"));
        assert!(overrides.live_server.is_none());
    }
}
