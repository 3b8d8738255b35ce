//! Local `.env` file source for development runs

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::ports::EnvironmentStore;

/// Outcome of one local file load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocalSourceSummary {
    /// Keys written into the environment
    pub applied: usize,
    /// Keys left untouched because they were already set
    pub kept_existing: usize,
}

/// Line the local file parser could not accept
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// No `=` on a non-comment line
    #[error("line {0}: expected KEY=VALUE")]
    MissingAssignment(usize),

    /// Key is empty or uses characters outside `[A-Za-z0-9_.]`
    #[error("line {line}: invalid key '{key}'")]
    InvalidKey {
        /// 1-based line number
        line: usize,
        /// Key as written
        key: String,
    },

    /// Quoted value without its closing quote
    #[error("line {0}: unterminated quoted value")]
    UnterminatedQuote(usize),

    /// Text after a closing quote that is not a comment
    #[error("line {0}: unexpected characters after quoted value")]
    TrailingCharacters(usize),
}

/// Reads `KEY=VALUE` lines from a local file into the environment
///
/// Values are taken as written: `$NAME` is never expanded. Single and double
/// quotes are stripped, and double-quoted values honour `\n`, `\t`, `\"` and
/// `\\`. Existing keys are never overwritten, so the process environment
/// always wins over the file and loading twice changes nothing.
#[derive(Debug, Clone)]
pub struct LocalSourceLoader {
    path: PathBuf,
}

impl LocalSourceLoader {
    /// Loader for the file at `path`; nothing is read until [`Self::load`]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// File this loader reads
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Merge the file into `env`
    ///
    /// A missing file is a no-op. An unreadable file or a malformed line is
    /// logged and the remainder of the file is skipped.
    pub fn load(&self, env: &mut dyn EnvironmentStore) -> LocalSourceSummary {
        let mut summary = LocalSourceSummary::default();
        let path = self.path.display().to_string();

        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path, "No local env file found");
                return summary;
            }
            Err(e) => {
                warn!(path = %path, error = %e, "Could not read local env file, skipping it");
                return summary;
            }
        };

        for (index, line) in contents.lines().enumerate() {
            let (key, value) = match parse_line(index + 1, line) {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    warn!(
                        path = %path,
                        error = %e,
                        "Malformed line in local env file, ignoring the rest of the file"
                    );
                    break;
                }
            };

            if env.has(&key) {
                summary.kept_existing += 1;
                continue;
            }
            match env.set(&key, &value) {
                Ok(()) => summary.applied += 1,
                Err(e) => warn!(path = %path, key = %key, error = %e, "Skipping local entry"),
            }
        }

        info!(
            path = %path,
            applied = summary.applied,
            kept_existing = summary.kept_existing,
            "Loaded local env file"
        );
        summary
    }
}

/// Parse one line; `None` for blanks and comments
fn parse_line(line_no: usize, line: &str) -> Result<Option<(String, String)>, LineError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let line = line.strip_prefix("export ").map_or(line, str::trim_start);

    let (key, raw) = line
        .split_once('=')
        .ok_or(LineError::MissingAssignment(line_no))?;
    let key = key.trim();
    let key_ok = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.');
    if !key_ok {
        return Err(LineError::InvalidKey {
            line: line_no,
            key: key.to_string(),
        });
    }

    let raw = raw.trim();
    let value = if let Some(rest) = raw.strip_prefix('\'') {
        let (value, tail) = rest
            .split_once('\'')
            .ok_or(LineError::UnterminatedQuote(line_no))?;
        ensure_comment_only(line_no, tail)?;
        value.to_string()
    } else if let Some(rest) = raw.strip_prefix('"') {
        let (value, tail) = unescape_double_quoted(line_no, rest)?;
        ensure_comment_only(line_no, tail)?;
        value
    } else {
        strip_inline_comment(raw).to_string()
    };

    Ok(Some((key.to_string(), value)))
}

/// Read up to the closing `"`, returning the value and what follows it
fn unescape_double_quoted(line_no: usize, rest: &str) -> Result<(String, &str), LineError> {
    let mut value = String::with_capacity(rest.len());
    let mut chars = rest.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => return Ok((value, &rest[i + 1..])),
            '\\' => match chars.next() {
                Some((_, 'n')) => value.push('\n'),
                Some((_, 't')) => value.push('\t'),
                Some((_, escaped @ ('"' | '\\' | '$'))) => value.push(escaped),
                Some((_, other)) => {
                    value.push('\\');
                    value.push(other);
                }
                None => break,
            },
            _ => value.push(c),
        }
    }
    Err(LineError::UnterminatedQuote(line_no))
}

fn ensure_comment_only(line_no: usize, tail: &str) -> Result<(), LineError> {
    let tail = tail.trim();
    if tail.is_empty() || tail.starts_with('#') {
        Ok(())
    } else {
        Err(LineError::TrailingCharacters(line_no))
    }
}

/// `#` starts a comment only after whitespace, so `a#b` stays intact
fn strip_inline_comment(raw: &str) -> &str {
    raw.char_indices()
        .find(|&(i, c)| c == '#' && raw[..i].ends_with(char::is_whitespace))
        .map_or(raw, |(i, _)| raw[..i].trim_end())
}
