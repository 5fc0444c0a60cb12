use displaydoc::Display;
use slog::{debug, Logger};
use std::{
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};
use thiserror::Error;

pub use metadata::Metadata;

mod metadata;

/// Coordinate format passed to `-c`, eight decimals with a trailing hemisphere letter.
pub const COORDINATE_FORMAT: &str = "%.8f";

#[derive(Error, Debug, Display)]
pub enum Error {
    /// exiftool returned failed status code: {0}
    ExiftoolCommandFailed(ExitStatus),
    /// io: {0}
    Io(#[from] std::io::Error),
    /// exiftool output is not utf-8: {0}
    NotUtf8(#[from] std::string::FromUtf8Error),
    /// malformed exiftool output on line {line}: {content:?}
    MalformedLine { line: usize, content: String },
}

/// Runs the `exiftool` binary and reads its `Key : Value` output.
#[derive(Debug, Clone)]
pub struct Exiftool {
    program: PathBuf,
}

impl Default for Exiftool {
    fn default() -> Self {
        Self {
            program: PathBuf::from("exiftool"),
        }
    }
}

impl Exiftool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn read(&self, path: &Path, logger: &Logger) -> Result<Metadata, Error> {
        let output = Command::new(&self.program)
            .arg("-c")
            .arg(COORDINATE_FORMAT)
            .arg(path)
            .output()?;
        if !output.status.success() {
            return Err(Error::ExiftoolCommandFailed(output.status));
        }
        let stdout = String::from_utf8(output.stdout)?;
        let metadata = parse_output(&stdout)?;
        debug!(logger, "read metadata"; "path" => path.display(), "fields" => metadata.len());
        Ok(metadata)
    }
}

/// Parses exiftool's default text output.
///
/// Each line is split on its first colon. The key is trimmed and the value
/// loses the whitespace that separates it from the colon; anything after that
/// is kept verbatim, including further colons (timestamps).
pub fn parse_output(output: &str) -> Result<Metadata, Error> {
    let mut metadata = Metadata::new();
    for (idx, line) in output.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let (key, value) = line.split_once(':').ok_or_else(|| Error::MalformedLine {
            line: idx + 1,
            content: line.to_string(),
        })?;
        metadata.insert(key.trim(), value.trim_start());
    }
    Ok(metadata)
}
