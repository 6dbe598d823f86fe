//! Errors raised while planning a synchronization

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyncError>;

#[derive(Error, Debug)]
pub enum SyncError {
    /// The development tree (or the subpath inside it) is missing
    #[error("\"{}\" does not exist or is not a directory", .0.display())]
    NotADirectory(PathBuf),

    /// No remote tree to synchronize with
    #[error("Server path is empty; set sync.server_path or pass --server-path")]
    EmptyServerPath,

    /// The project settings file could not be read or parsed
    #[error("Project settings {}: {message}", .path.display())]
    Settings { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
