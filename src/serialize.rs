//! Rendering a [`Document`] back to text.

use std::fmt::{self, Write as _};
use std::io::{self, BufWriter, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::Document;

const OUTPUT_BUFFER_SIZE: usize = 32 * 1024;

/// Terminator written after every line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            LineEnding::Lf => "lf",
            LineEnding::CrLf => "crlf",
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lf" => Ok(LineEnding::Lf),
            "crlf" => Ok(LineEnding::CrLf),
            _ => Err(format!("unsupported line ending '{s}' (expected lf or crlf)")),
        }
    }
}

/// Write every line of `document` to `sink`, buffered, then flush.
pub fn write_document<W: Write>(
    document: &Document,
    sink: W,
    ending: LineEnding,
) -> io::Result<()> {
    let mut out = BufWriter::with_capacity(OUTPUT_BUFFER_SIZE, sink);
    for line in document.lines() {
        write!(out, "{line}")?;
        out.write_all(ending.as_str().as_bytes())?;
    }
    out.flush()
}

/// Render the whole document into one string.
pub fn render_to_string(document: &Document, ending: LineEnding) -> String {
    let mut out = String::new();
    for line in document.lines() {
        // Writing into a String cannot fail.
        let _ = write!(out, "{line}");
        out.push_str(ending.as_str());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocumentBuilder, MergePolicy};
    use crate::line::Line;

    fn sample() -> Document {
        let mut builder = DocumentBuilder::new(MergePolicy::KeepFirst);
        builder.extend([
            Line::comment("; top"),
            Line::Empty,
            Line::section("a"),
            Line::property("x", "1"),
        ]);
        builder.finish()
    }

    #[test]
    fn test_render_lf() {
        assert_eq!(
            render_to_string(&sample(), LineEnding::Lf),
            "; top\n\n[a]\nx = 1\n"
        );
    }

    #[test]
    fn test_render_crlf() {
        assert_eq!(
            render_to_string(&sample(), LineEnding::CrLf),
            "; top\r\n\r\n[a]\r\nx = 1\r\n"
        );
    }

    #[test]
    fn test_empty_document_renders_nothing() {
        let doc = DocumentBuilder::default().finish();
        assert_eq!(render_to_string(&doc, LineEnding::Lf), "");
    }

    #[test]
    fn test_write_document_matches_render() {
        let doc = sample();
        let mut out = Vec::new();
        write_document(&doc, &mut out, LineEnding::Lf).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            render_to_string(&doc, LineEnding::Lf)
        );
    }

    #[test]
    fn test_write_document_propagates_sink_error() {
        struct Full;
        impl Write for Full {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::WriteZero, "full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let err = write_document(&sample(), Full, LineEnding::Lf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn test_line_ending_from_str() {
        assert_eq!("CRLF".parse::<LineEnding>(), Ok(LineEnding::CrLf));
        assert!("cr".parse::<LineEnding>().is_err());
    }
}
