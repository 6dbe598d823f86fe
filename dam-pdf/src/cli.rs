//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dam_common::config::{CREATOR_ENV_VAR, MUSIC_DB_ENV_VAR};

/// Sheet music PDF metadata
#[derive(Parser, Debug)]
#[command(name = "dam-pdf")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Sheet music database (default: <data folder>/music.sqlite)
    #[arg(long, global = true, env = MUSIC_DB_ENV_VAR)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Delete every metadata row and recreate the table
    ResetDb {
        /// Do not ask for confirmation
        #[arg(long)]
        yes: bool,
    },

    /// Load a .csv or .tsv export of the spreadsheet or of the table
    Load {
        /// Empty the table first
        #[arg(long)]
        reset: bool,

        file: PathBuf,
    },

    /// Write every row to a .csv or .tsv file
    Export { file: PathBuf },

    /// Write forScore's metadata import CSV (default: ~/Desktop/4sMeta.csv)
    Forscore {
        file: Option<PathBuf>,

        /// Overwrite an existing file without asking
        #[arg(long)]
        yes: bool,
    },

    /// Write metadata into PDFs, matched to rows by file name
    Apply {
        /// Print the commands instead of running them
        #[arg(long)]
        print: bool,

        /// Name for the Creator tag
        #[arg(long, env = CREATOR_ENV_VAR)]
        creator: Option<String>,

        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}
