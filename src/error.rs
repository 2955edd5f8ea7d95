//! Error types for the parsing pipeline

use std::fmt;
use std::io;

/// Which grammar rule a malformed line broke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatErrorKind {
    /// `[` with no closing `]`
    UnterminatedSection,
    /// Non-blank, non-comment, non-section line without `=`
    MissingEquals,
}

/// A line that does not fit the grammar. Fatal for the whole stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatError {
    /// 1-based line number
    pub line: usize,
    pub kind: FormatErrorKind,
    /// The line as read, before trimming (CR already stripped)
    pub raw: String,
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FormatErrorKind::UnterminatedSection => write!(
                f,
                "line {}: invalid section \"{}\" (missing ']')",
                self.line, self.raw
            ),
            FormatErrorKind::MissingEquals => write!(
                f,
                "line {}: invalid property \"{}\" (missing '=')",
                self.line, self.raw
            ),
        }
    }
}

impl std::error::Error for FormatError {}

/// Everything that can stop a pipeline run
#[derive(Debug)]
pub enum Error {
    /// Malformed input
    Format(FormatError),
    /// The run was cancelled; not a problem with the data
    Cancelled,
    /// Reading from the byte source failed
    Source(io::Error),
    /// Writing to the byte sink failed
    Sink(io::Error),
}

impl Error {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }

    pub fn as_format(&self) -> Option<&FormatError> {
        match self {
            Error::Format(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Format(e) => write!(f, "format error: {e}"),
            Error::Cancelled => f.write_str("operation cancelled"),
            Error::Source(e) => write!(f, "failed to read input: {e}"),
            Error::Sink(e) => write!(f, "failed to write output: {e}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Format(e) => Some(e),
            Error::Cancelled => None,
            Error::Source(e) | Error::Sink(e) => Some(e),
        }
    }
}

impl From<FormatError> for Error {
    fn from(e: FormatError) -> Self {
        Error::Format(e)
    }
}
