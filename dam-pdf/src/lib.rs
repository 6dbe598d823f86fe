//! dam-pdf library: sheet music PDF metadata
//!
//! Keeps one metadata row per PDF in `music.sqlite`, loads it from the
//! spreadsheet, exports it for forScore and writes it into the PDFs.

pub mod apply;
pub mod cli;
pub mod sheet;
pub mod tasks;
