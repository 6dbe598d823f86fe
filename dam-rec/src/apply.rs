//! Command lines that write recording metadata into finished files
//!
//! A file belongs to the recording whose `session` equals the file stem.
//! Programs get an `exiftool` or `bwfmetaedit` call by extension; every
//! matched file is then touched to the recording date.

use std::path::Path;

use chrono::NaiveDateTime;
use dam_common::escape::escape_shell_arg;
use dam_common::record::date;
use dam_common::shell::ShellCommand;
use dam_common::Record;

/// Hour a video upload is stamped with
const UPLOAD_TIME: &str = "15:00";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// Concert program
    Pdf,
    /// Audio master
    Wav,
    /// Video
    Mov,
    /// Notes; only the date is set
    Txt,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "pdf" => Some(MediaKind::Pdf),
            "wav" => Some(MediaKind::Wav),
            "mov" => Some(MediaKind::Mov),
            "txt" => Some(MediaKind::Txt),
            _ => None,
        }
    }
}

/// Session name a file belongs to: its name without extension
pub fn session_of(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

/// Why a file gets no commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    UnknownExtension,
    NoRecordingDate,
}

/// Shell-escaped field, or `''` when unset
fn arg(recording: &Record, field: &str) -> String {
    recording
        .shell_escaped_value_of(field)
        .unwrap_or_else(|| escape_shell_arg(""))
}

fn date_arg(dt: &NaiveDateTime, format: &str) -> String {
    escape_shell_arg(&dt.format(format).to_string())
}

/// Metadata command (if the kind has one) followed by the touch command
pub fn commands_for(
    file: &Path,
    recording: &Record,
    creator: &str,
) -> Result<Vec<ShellCommand>, Skip> {
    let kind = MediaKind::from_path(file).ok_or(Skip::UnknownExtension)?;
    let recorded_on = recording
        .date_time_of("recorded_on")
        .filter(|dt| date::is_set(&dt.date()))
        .ok_or(Skip::NoRecordingDate)?;

    let me = escape_shell_arg(creator);
    let name = escape_shell_arg(&file.to_string_lossy());
    let mut commands = Vec::with_capacity(2);

    match kind {
        MediaKind::Pdf => commands.push(ShellCommand::new(format!(
            "exiftool -overwrite_original_in_place -Creator={} -Title={} -Author={} -Subject={} {}",
            me,
            arg(recording, "tape"),
            arg(recording, "performers"),
            escape_shell_arg("concert program"),
            name
        ))),
        MediaKind::Wav => {
            let reference = format!(
                "{}{}",
                recording.display_of("reference").unwrap_or_default(),
                recorded_on.format("%Y%m%d%H%M")
            );
            let imed = format!(
                "{}-{}",
                recording.display_of("medium").unwrap_or_default(),
                recording.display_of("encoding").unwrap_or_default()
            );
            commands.push(ShellCommand::new(format!(
                "bwfmetaedit --MD5-Embed-Overwrite --Originator={} --OriginatorReference={} \
                 --OriginationDate={} --OriginationTime={} --Description={} --ICMS={} --ICRD={} \
                 --IMED={} --IENG={} --ITCH={} {}",
                me,
                escape_shell_arg(&reference),
                date_arg(&recorded_on, "%Y-%m-%d"),
                date_arg(&recorded_on, "%H:%M:%S"),
                arg(recording, "description"),
                arg(recording, "performers"),
                date_arg(&recorded_on, "%Y-%m-%d"),
                escape_shell_arg(&imed),
                me,
                me,
                name
            )));
        }
        MediaKind::Mov => {
            let uploaded = recording
                .display_of("uploaded_on")
                .filter(|d| !d.is_empty())
                .map(|d| format!("{} {}", d, UPLOAD_TIME))
                .unwrap_or_default();
            commands.push(ShellCommand::new(format!(
                "exiftool -overwrite_original_in_place -Creator={} -Title={} -Artist={} \
                 -Description={} -CreateDate={} -MediaCreateDate={} {}",
                me,
                arg(recording, "tape"),
                arg(recording, "performers"),
                arg(recording, "description"),
                date_arg(&recorded_on, "%Y-%m-%d"),
                escape_shell_arg(&uploaded),
                name
            )));
        }
        MediaKind::Txt => {}
    }

    commands.push(ShellCommand::new(format!(
        "touch -t {} {}",
        recorded_on.format("%Y%m%d%H%M"),
        name
    )));
    Ok(commands)
}
