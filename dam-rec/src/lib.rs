//! dam-rec library: recording projects log
//!
//! Keeps one row per recording session in `recording_projects.db`, moves the
//! log to and from spreadsheets, and writes session metadata into the
//! finished program, audio and video files.

pub mod apply;
pub mod cli;
pub mod tasks;
