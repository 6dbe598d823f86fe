//! dam-sync library: rsync wrapper for a CMS code tree
//!
//! Moves only the files that matter for code maintenance between a
//! development directory, a local testing server and the live server,
//! leaving caches, uploads and bulky data behind.

pub mod cli;
pub mod error;
pub mod plan;
pub mod settings;

pub use error::{Result, SyncError};
pub use plan::{Direction, SyncOptions, SyncPlan};
