//! `exiftool` command lines that write sheet music metadata into PDFs

use std::path::Path;

use dam_common::escape::escape_shell_arg;
use dam_common::shell::ShellCommand;
use dam_common::Record;

/// Document Info entries and the `pdf_meta` field each one comes from
const TAGS: [(&str, &str); 4] = [
    ("Title", "title"),
    ("Author", "author"),
    ("Subject", "subject"),
    ("Keywords", "keywords"),
];

/// Metadata rows are keyed by file name without directories
pub fn lookup_name(file: &Path) -> Option<&str> {
    file.file_name().and_then(|n| n.to_str())
}

/// Tagging command for `file`, or `None` when the row has no title
pub fn command_for(file: &Path, meta: &Record, creator: &str) -> Option<ShellCommand> {
    if meta.str_of("title").map_or(true, str::is_empty) {
        return None;
    }

    let mut line = format!(
        "exiftool -overwrite_original -Creator={}",
        escape_shell_arg(creator)
    );
    for (tag, field) in TAGS {
        if let Some(value) = meta.shell_escaped_value_of(field) {
            line.push_str(&format!(" -{}={}", tag, value));
        }
    }
    line.push(' ');
    line.push_str(&escape_shell_arg(&file.to_string_lossy()));
    Some(ShellCommand::new(line))
}
