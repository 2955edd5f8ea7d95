//! Classified lines.
//!
//! Grammar, checked against the first non-blank byte of a line:
//! - nothing left: [`Line::Empty`]
//! - `#` or `;`: [`Line::Comment`], the marker is part of the text
//! - `[`: [`Line::Section`], name runs to the first `]`
//! - anything else: [`Line::Property`], split at the first `=`
//!
//! Values are owned once classified; the scanner's buffers are reused after
//! every line.

use std::fmt;

use crate::bytes::{trim, trim_end, trim_start, ByteSeq};
use crate::error::{FormatError, FormatErrorKind};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Empty,
    Comment { text: String },
    Section { name: String },
    Property { key: String, value: String },
}

impl Line {
    pub fn comment(text: impl Into<String>) -> Self {
        Line::Comment { text: text.into() }
    }

    pub fn section(name: impl Into<String>) -> Self {
        Line::Section { name: name.into() }
    }

    pub fn property(key: impl Into<String>, value: impl Into<String>) -> Self {
        Line::Property {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Short tag for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Line::Empty => "empty",
            Line::Comment { .. } => "comment",
            Line::Section { .. } => "section",
            Line::Property { .. } => "property",
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line::Empty => Ok(()),
            Line::Comment { text } => f.write_str(text),
            Line::Section { name } => write!(f, "[{name}]"),
            Line::Property { key, value } => write!(f, "{key} = {value}"),
        }
    }
}

/// Classify one raw line (terminator already removed).
///
/// `number` only feeds error messages.
pub fn classify(number: usize, raw: ByteSeq<'_>) -> Result<Line, FormatError> {
    let rest = trim_start(raw);
    let Some(first) = rest.first() else {
        return Ok(Line::Empty);
    };

    let malformed = |kind| FormatError {
        line: number,
        kind,
        raw: raw.to_string_lossy(),
    };

    match first {
        b'#' | b';' => Ok(Line::Comment {
            text: trim_end(rest).to_string_lossy(),
        }),
        b'[' => {
            let inner = rest.slice(1..rest.len());
            let close = inner
                .position(b']')
                .ok_or_else(|| malformed(FormatErrorKind::UnterminatedSection))?;

            Ok(Line::Section {
                name: trim(inner.slice(0..close)).to_string_lossy(),
            })
        }
        _ => {
            let eq = rest
                .position(b'=')
                .ok_or_else(|| malformed(FormatErrorKind::MissingEquals))?;

            Ok(Line::Property {
                key: trim(rest.slice(0..eq)).to_string_lossy(),
                value: trim(rest.slice(eq + 1..rest.len())).to_string_lossy(),
            })
        }
    }
}
