//! Running generated command lines
//!
//! Command lines are assembled as text from shell-escaped values and handed
//! to `sh -c`. In print mode they are written to stdout instead, so a run can
//! be reviewed or saved as a script. Commands run one at a time.

use std::process::Stdio;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::Result;

/// A command line plus optional text for its stdin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub line: String,
    pub stdin: Option<String>,
}

impl ShellCommand {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into(),
            stdin: None,
        }
    }

    pub fn with_stdin(mut self, input: impl Into<String>) -> Self {
        self.stdin = Some(input.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Print each command line; run nothing
    Print,
    Execute,
}

/// Runs commands in order and counts the ones that failed
#[derive(Debug)]
pub struct Runner {
    mode: RunMode,
    succeeded: usize,
    failed: usize,
}

impl Runner {
    pub fn new(mode: RunMode) -> Self {
        Self {
            mode,
            succeeded: 0,
            failed: 0,
        }
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Print or execute `command`; returns whether it succeeded
    ///
    /// A non-zero exit is logged and counted, not returned as an error. Only
    /// failing to start `sh` at all is an error.
    pub async fn run(&mut self, command: &ShellCommand) -> Result<bool> {
        if self.mode == RunMode::Print {
            println!("{}", command.line);
            self.succeeded += 1;
            return Ok(true);
        }

        debug!("Running: {}", command.line);
        let status = run_sh(command).await?;
        if status.success() {
            self.succeeded += 1;
            Ok(true)
        } else {
            warn!("Command failed ({}): {}", status, command.line);
            self.failed += 1;
            Ok(false)
        }
    }
}

async fn run_sh(command: &ShellCommand) -> Result<std::process::ExitStatus> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg(&command.line)
        .stdin(if command.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::inherit()
        })
        .spawn()?;

    if let (Some(input), Some(mut stdin)) = (command.stdin.as_deref(), child.stdin.take()) {
        stdin.write_all(input.as_bytes()).await?;
        // Dropping stdin closes the pipe so the child sees end of input
        drop(stdin);
    }

    Ok(child.wait().await?)
}

/// Ask a yes/no question on the terminal; only `y` or `yes` confirms
pub fn confirm(question: &str) -> Result<bool> {
    use std::io::{BufRead, Write};

    print!("{} (y/n) ", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
