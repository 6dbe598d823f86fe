//! # DAM Common Library
//!
//! Shared code for the digital asset management tools:
//! - Typed, validated records and the schemas built on them
//! - SQLite persistence for recordings and sheet music metadata
//! - CSV/TSV and forScore import/export
//! - Shell escaping and command execution
//! - Configuration loading and log setup

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod escape;
pub mod forscore;
pub mod logging;
pub mod record;
pub mod schemas;
pub mod shell;
pub mod tabular;

pub use error::{Error, Result};
pub use record::{Record, RecordError, Value};
