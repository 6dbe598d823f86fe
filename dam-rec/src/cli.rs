//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dam_common::config::{CREATOR_ENV_VAR, RECORDINGS_DB_ENV_VAR};

/// Recording projects log and file tagging
#[derive(Parser, Debug)]
#[command(name = "dam-rec")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Recording projects database (default: <data folder>/recording_projects.db)
    #[arg(long, global = true, env = RECORDINGS_DB_ENV_VAR)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database, or add columns missing from an older one
    CreateDb,

    /// Load recordings from a .csv or .tsv file, replacing rows with the same session
    Import { file: PathBuf },

    /// Write every recording to a .csv or .tsv file
    Export { file: PathBuf },

    /// Print every recording as JSON
    Dump,

    /// Print every table of any SQLite file as JSON, opened read-only
    DumpSqlite { file: PathBuf },

    /// Re-validate every stored recording
    Check,

    /// Set loaded_on from the ProTools session files under a folder
    LoadDates { folder: PathBuf },

    /// Copy descriptions from a file of saved bexttool command lines
    BextDescriptions { file: PathBuf },

    /// Write recording metadata into finished files named after their session
    Apply {
        /// Print the commands instead of running them
        #[arg(long)]
        print: bool,

        /// Name for the Creator and Originator tags
        #[arg(long, env = CREATOR_ENV_VAR)]
        creator: Option<String>,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}
