//! Shell argument escaping
//!
//! Values are backslash-escaped rather than wrapped in quotes, so they can be
//! glued onto option prefixes such as `-Title=` when command lines are built
//! by string formatting.

use crate::{Error, Result};

/// Characters a POSIX shell would interpret inside an unquoted word
const SPECIAL: &[char] = &[
    ' ', '\t', '\'', '"', '(', ')', '[', ']', '{', '}', '*', '?', '\\', '$', '`', ';', '&', '|',
    '<', '>', '!', '#', '~',
];

/// Escape `text` so the shell reads it back as exactly one literal word
///
/// Empty input becomes `''` so it still occupies an argument position.
pub fn escape_shell_arg(text: &str) -> String {
    if text.is_empty() {
        return "''".to_string();
    }

    let mut out = String::with_capacity(text.len() + text.len() / 4);
    for c in text.chars() {
        match c {
            // Backslash-newline is a line continuation; quote the newline instead
            '\n' => out.push_str("'\n'"),
            c if SPECIAL.contains(&c) => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out
}

/// Split a command line into words the way a POSIX shell quotes them
///
/// Handles single quotes, double quotes and backslash escapes. Nothing is
/// expanded: `$VAR` and globs stay literal.
pub fn split_shell_words(line: &str) -> Result<Vec<String>> {
    let mut words = Vec::new();
    let mut word = String::new();
    let mut in_word = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut word));
                    in_word = false;
                }
            }
            '\\' => {
                in_word = true;
                match chars.next() {
                    Some('\n') | None => {}
                    Some(next) => word.push(next),
                }
            }
            '\'' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(inner) => word.push(inner),
                        None => return Err(unclosed(line, '\'')),
                    }
                }
            }
            '"' => {
                in_word = true;
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\\') => match chars.next() {
                            Some(next @ ('"' | '\\' | '$' | '`')) => word.push(next),
                            Some('\n') => {}
                            Some(next) => {
                                word.push('\\');
                                word.push(next);
                            }
                            None => return Err(unclosed(line, '"')),
                        },
                        Some(inner) => word.push(inner),
                        None => return Err(unclosed(line, '"')),
                    }
                }
            }
            c => {
                in_word = true;
                word.push(c);
            }
        }
    }

    if in_word {
        words.push(word);
    }
    Ok(words)
}

fn unclosed(line: &str, quote: char) -> Error {
    Error::InvalidInput(format!("unclosed {} in: {}", quote, line))
}
