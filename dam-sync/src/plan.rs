//! rsync command and filter rules for one synchronization
//!
//! Rules are fed to rsync on stdin through `--filter=._-`, so the command
//! line stays short and the rule list can be printed for review first.
//! Exclusions come first; the final rule either includes everything or
//! narrows the transfer to one subtree.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use dam_common::config::SyncConfig;
use dam_common::escape::escape_shell_arg;
use dam_common::shell::ShellCommand;

use crate::error::{Result, SyncError};
use crate::settings::PROJECT_FILE;

/// Program and options used for every transfer
pub const RSYNC: &str = "rsync --filter=._- -rltDumOe ssh";

/// Editor, VCS and log files never leave the development tree
pub const COMMON_FILTER: &[&str] = &[
    "- /.idea/***",
    "- /.editorconfig",
    "- .DS_Store",
    "- .git*",
    "- .git*/**",
    "- /.well-known/***",
    "- *.log",
    "- *.csv",
];

/// Archives, hashed temporaries and imports that only exist on the live server
pub const LIVE_FILTER: &[&str] = &[
    "- *.zip",
    "- *[0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f][0-9a-f]",
    "- IMPORT_*[0-9]",
    "- sugarcrm_old.sql",
    "- 09888",
];

/// Generated and uploaded data that must not be pushed back to live
pub const TO_LIVE_FILTER: &[&str] = &[
    "- *~",
    "- /cache/***",
    "- /custom/history/***",
    "- /upload/***",
    "- /upload:/**",
    "- /vendor/**",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    /// Live server to the development tree
    #[value(alias = "livetodev")]
    LiveToDev,
    /// Development tree to the live server
    #[value(alias = "devtolive")]
    DevToLive,
    /// Development tree to the local testing server
    #[value(alias = "devtolocal")]
    DevToLocal,
    /// Local testing server to the development tree
    #[value(alias = "localtodev")]
    LocalToDev,
}

impl Direction {
    pub fn is_live(self) -> bool {
        matches!(self, Direction::LiveToDev | Direction::DevToLive)
    }

    /// True when the development tree is the source
    pub fn from_dev(self) -> bool {
        matches!(self, Direction::DevToLive | Direction::DevToLocal)
    }
}

/// Extra rsync options chosen on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Dry run that reports which filter rule matched each file
    pub dry_run_debug: bool,
    /// Dry run that lists every change
    pub itemize: bool,
    /// Overall progress and transfer statistics
    pub stats: bool,
}

impl SyncOptions {
    fn args(&self) -> String {
        let mut args = String::new();
        if self.dry_run_debug {
            args.push_str(" --dry-run --debug=filter1");
        }
        if self.itemize {
            args.push_str(" --dry-run --itemize-changes");
        }
        if self.stats {
            args.push_str(" --info=progress2,stats2");
        }
        args
    }
}

/// `host:` for a remote host; empty for a locally mounted tree
pub fn host_prefix(host: &str) -> String {
    let host = host.trim();
    if host.is_empty() || host.ends_with(':') {
        host.to_string()
    } else {
        format!("{}:", host)
    }
}

pub fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{}/", path)
    }
}

/// Subtree relative to the tree root, without surrounding slashes
fn normalize_subpath(subpath: Option<&str>) -> Option<String> {
    subpath
        .map(|s| s.trim().trim_matches('/'))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Include rules for each parent directory of a subpath, outermost first
///
/// rsync only visits a directory whose parents were not excluded.
fn ancestor_rules(subpath: &str) -> Vec<String> {
    let parts: Vec<&str> = subpath.split('/').filter(|p| !p.is_empty()).collect();
    (1..parts.len())
        .map(|depth| format!("+ /{}/", parts[..depth].join("/")))
        .collect()
}

/// Everything needed to print or run one transfer
#[derive(Debug, Clone, PartialEq)]
pub struct SyncPlan {
    pub direction: Direction,
    /// Development tree root
    pub dev: PathBuf,
    pub subpath: Option<String>,
    pub options: SyncOptions,
    pub config: SyncConfig,
}

impl SyncPlan {
    pub fn new(
        direction: Direction,
        dev: &Path,
        subpath: Option<&str>,
        options: SyncOptions,
        config: SyncConfig,
    ) -> Result<Self> {
        if config.server_path.trim().is_empty() {
            return Err(SyncError::EmptyServerPath);
        }
        Ok(Self {
            direction,
            dev: dev.to_path_buf(),
            subpath: normalize_subpath(subpath),
            options,
            config,
        })
    }

    /// The development tree, and the subtree when one is given, must exist
    pub fn check_paths(&self) -> Result<()> {
        let local = match &self.subpath {
            Some(sub) => self.dev.join(sub),
            None => self.dev.clone(),
        };
        if local.is_dir() {
            Ok(())
        } else {
            Err(SyncError::NotADirectory(local))
        }
    }

    /// Filter rules, one per line, in the order rsync applies them
    pub fn filters(&self) -> String {
        let mut rules = vec![format!("- /{}", PROJECT_FILE)];
        rules.extend(COMMON_FILTER.iter().map(|r| r.to_string()));
        rules.extend(self.config.extra_filters.iter().cloned());
        if self.direction.is_live() {
            rules.extend(LIVE_FILTER.iter().map(|r| r.to_string()));
        }
        if self.direction == Direction::DevToLive {
            rules.extend(TO_LIVE_FILTER.iter().map(|r| r.to_string()));
        }
        match &self.subpath {
            Some(sub) => {
                rules.extend(ancestor_rules(sub));
                rules.push(format!("+ /{}/***", sub));
                rules.push("- /**".to_string());
            }
            None => rules.push("+ /**".to_string()),
        }

        let mut text = rules.join("\n");
        text.push('\n');
        text
    }

    fn server_tree(&self) -> String {
        let host = if self.direction.is_live() {
            &self.config.live_server
        } else {
            &self.config.local_server
        };
        format!(
            "{}{}",
            host_prefix(host),
            with_trailing_slash(self.config.server_path.trim())
        )
    }

    fn dev_tree(&self) -> String {
        with_trailing_slash(&self.dev.to_string_lossy())
    }

    pub fn command_line(&self) -> String {
        let mut line = format!("{}{}", RSYNC, self.options.args());
        if self.direction.is_live() {
            if let Some(limit) = self.config.bandwidth_limit.as_deref() {
                line.push_str(&format!(" --bwlimit={}", limit));
            }
        }

        let (src, dst) = if self.direction.from_dev() {
            (self.dev_tree(), self.server_tree())
        } else {
            (self.server_tree(), self.dev_tree())
        };
        line.push_str(&format!(
            " {} {}",
            escape_shell_arg(&src),
            escape_shell_arg(&dst)
        ));
        line
    }

    /// Command line with the filter rules on its stdin
    pub fn shell_command(&self) -> ShellCommand {
        ShellCommand::new(self.command_line()).with_stdin(self.filters())
    }
}
