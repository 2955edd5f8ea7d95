//! Source to document: scanner, classifier and merger driven by one pull loop.
//!
//! Parsing is strict. The first malformed line fails the whole stream and no
//! partial document is returned.

use crate::document::{Document, DocumentBuilder, MergePolicy};
use crate::error::Error;
use crate::line::{classify, Line};
use crate::scanner::{CancelToken, ChunkSource, IterSource, LineScanner};

/// Sees every classified line, in input order. Cannot affect the result.
pub trait LineObserver {
    fn observe(&mut self, line_number: usize, line: &Line);
}

impl<F: FnMut(usize, &Line)> LineObserver for F {
    fn observe(&mut self, line_number: usize, line: &Line) {
        self(line_number, line)
    }
}

/// Emits one `trace` event per classified line.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl LineObserver for TracingObserver {
    fn observe(&mut self, line_number: usize, line: &Line) {
        tracing::trace!(line = line_number, kind = line.kind(), "{line}");
    }
}

/// Scanner plus classifier, yielding owned [`Line`]s.
///
/// Stops for good after the first error.
#[derive(Debug)]
pub struct LineReader<S> {
    scanner: LineScanner<S>,
    failed: bool,
}

impl<S: ChunkSource> LineReader<S> {
    pub fn new(source: S) -> Self {
        Self {
            scanner: LineScanner::new(source),
            failed: false,
        }
    }

    pub fn with_cancel(self, cancel: CancelToken) -> Self {
        Self {
            scanner: self.scanner.with_cancel(cancel),
            failed: self.failed,
        }
    }

    /// Number of the last line read
    pub fn line_number(&self) -> usize {
        self.scanner.line_number()
    }
}

impl<S: ChunkSource> Iterator for LineReader<S> {
    type Item = Result<Line, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = match self.scanner.next_line() {
            Ok(None) => return None,
            Ok(Some(raw)) => classify(raw.number, raw.bytes).map_err(Error::from),
            Err(e) => Err(e),
        };

        self.failed = result.is_err();
        Some(result)
    }
}

/// Settings for one pipeline run
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    pub policy: MergePolicy,
    pub cancel: Option<CancelToken>,
}

impl ParseOptions {
    pub fn new(policy: MergePolicy) -> Self {
        Self {
            policy,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Read `source` to the end and merge it into a [`Document`].
pub fn parse_document<S: ChunkSource>(source: S, options: &ParseOptions) -> Result<Document, Error> {
    parse_document_observed(source, options, &mut |_: usize, _: &Line| {})
}

/// Like [`parse_document`], reporting each classified line to `observer`
/// before it is merged.
pub fn parse_document_observed<S: ChunkSource>(
    source: S,
    options: &ParseOptions,
    observer: &mut dyn LineObserver,
) -> Result<Document, Error> {
    let mut reader = LineReader::new(source);
    if let Some(cancel) = &options.cancel {
        reader = reader.with_cancel(cancel.clone());
    }

    let mut builder = DocumentBuilder::new(options.policy);
    while let Some(line) = reader.next() {
        let line = line?;
        observer.observe(reader.line_number(), &line);
        builder.push(line);
    }

    Ok(builder.finish())
}

/// Parse an in-memory string as a single chunk.
pub fn parse_str(text: &str, policy: MergePolicy) -> Result<Document, Error> {
    parse_document(IterSource::new([text]), &ParseOptions::new(policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatErrorKind;
    use crate::scanner::ReadSource;
    use crate::serialize::{render_to_string, LineEnding};
    use proptest::prelude::*;

    fn classify_chunks(chunks: &[&[u8]]) -> Vec<Line> {
        LineReader::new(IterSource::new(chunks.iter().copied()))
            .collect::<Result<_, _>>()
            .unwrap()
    }

    fn roundtrip(text: &str, policy: MergePolicy) -> String {
        render_to_string(&parse_str(text, policy).unwrap(), LineEnding::Lf)
    }

    #[test]
    fn test_every_split_point_yields_same_lines() {
        let input = b"[a]\nx=1\n";
        for cut in 0..=input.len() {
            let (left, right) = input.split_at(cut);
            assert_eq!(
                classify_chunks(&[left, right]),
                [Line::section("a"), Line::property("x", "1")],
                "split at {cut}"
            );
        }
    }

    #[test]
    fn test_byte_at_a_time_crlf() {
        let input = b"; c\r\n[s]\r\nk = v\r\n";
        let chunks: Vec<&[u8]> = input.chunks(1).collect();
        assert_eq!(
            classify_chunks(&chunks),
            [Line::comment("; c"), Line::section("s"), Line::property("k", "v")]
        );
    }

    #[test]
    fn test_keep_first_keeps_first_value() {
        assert_eq!(roundtrip("a=1\na=2\n", MergePolicy::KeepFirst), "a = 1\n");
    }

    #[test]
    fn test_keep_last_moves_property() {
        assert_eq!(
            roundtrip("a=1\nb=0\na=2\n", MergePolicy::KeepLast),
            "b = 0\na = 2\n"
        );
    }

    #[test]
    fn test_replace_in_place() {
        assert_eq!(
            roundtrip("a=1\nb=0\na=2\n", MergePolicy::ReplaceInPlace),
            "a = 2\nb = 0\n"
        );
    }

    #[test]
    fn test_case_insensitive_section_merge() {
        let doc = parse_str("[Foo]\nX=1\n[foo]\nY=2\n", MergePolicy::KeepFirst).unwrap();
        assert_eq!(doc.sections().len(), 2);
        let foo = &doc.sections()[1];
        assert_eq!(foo.name(), "Foo");
        assert_eq!(
            foo.lines(),
            [
                Line::section("Foo"),
                Line::property("X", "1"),
                Line::property("Y", "2")
            ]
        );
        assert_eq!(
            render_to_string(&doc, LineEnding::Lf),
            "[Foo]\nX = 1\nY = 2\n"
        );
    }

    #[test]
    fn test_comment_and_blank_roundtrip() {
        assert_eq!(roundtrip("; note\n\n", MergePolicy::KeepFirst), "; note\n\n");
    }

    #[test]
    fn test_global_section_emitted_first() {
        let text = "[a]\nx = 1\n";
        let doc = parse_str(&format!("# head\nroot = true\n{text}"), MergePolicy::KeepFirst)
            .unwrap();
        assert_eq!(doc.sections()[0].name(), "Global");
        assert_eq!(
            render_to_string(&doc, LineEnding::Lf),
            format!("# head\nroot = true\n{text}")
        );
    }

    #[test]
    fn test_unterminated_section_reports_line_1() {
        let err = parse_str("[Unterminated\n", MergePolicy::KeepFirst).unwrap_err();
        let format = err.as_format().expect("format error");
        assert_eq!(format.line, 1);
        assert_eq!(format.kind, FormatErrorKind::UnterminatedSection);
        assert_eq!(format.raw, "[Unterminated");
    }

    #[test]
    fn test_missing_equals_reports_line_1() {
        let err = parse_str("novalue\n", MergePolicy::KeepFirst).unwrap_err();
        let format = err.as_format().expect("format error");
        assert_eq!(format.line, 1);
        assert_eq!(format.kind, FormatErrorKind::MissingEquals);
    }

    #[test]
    fn test_error_line_number_counts_blank_lines() {
        let err = parse_str("a=1\n\n; c\nbroken\n", MergePolicy::KeepFirst).unwrap_err();
        assert_eq!(err.as_format().map(|e| e.line), Some(4));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let mut reader = LineReader::new(IterSource::new(["bad\ngood=1\n"]));
        assert!(matches!(reader.next(), Some(Err(Error::Format(_)))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_final_line_without_newline_is_kept() {
        assert_eq!(
            roundtrip("[a]\nx=1", MergePolicy::KeepFirst),
            "[a]\nx = 1\n"
        );
    }

    #[test]
    fn test_cancelled_before_start_is_not_format_error() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let options = ParseOptions::new(MergePolicy::KeepFirst).with_cancel(cancel);

        let err = parse_document(IterSource::new(["not valid\n"]), &options).unwrap_err();
        assert!(err.is_cancelled());
    }

    #[test]
    fn test_cancel_mid_stream_stops_observing() {
        let cancel = CancelToken::new();
        let options = ParseOptions::new(MergePolicy::KeepFirst).with_cancel(cancel.clone());

        let mut seen = vec![];
        let mut observer = |n: usize, _: &Line| {
            seen.push(n);
            if n == 2 {
                cancel.cancel();
            }
        };

        let err = parse_document_observed(
            IterSource::new(["a=1\nb=2\n", "c=3\nd=4\n"]),
            &options,
            &mut observer,
        )
        .unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(seen, [1, 2]);
    }

    #[test]
    fn test_observer_sees_every_line() {
        let mut seen = vec![];
        let mut observer = |n: usize, line: &Line| seen.push((n, line.kind()));
        parse_document_observed(
            IterSource::new(["# c\n\n[s]\nk=v"]),
            &ParseOptions::default(),
            &mut observer,
        )
        .unwrap();

        assert_eq!(
            seen,
            [(1, "comment"), (2, "empty"), (3, "section"), (4, "property")]
        );
    }

    #[test]
    fn test_read_source_chunk_sizes_agree() {
        let text = "root = true\n\n[*]\r\nindent_style = space\nINDENT_STYLE = tab\n[*.md]\n; md\n";
        let expected = parse_str(text, MergePolicy::ReplaceInPlace).unwrap();
        for size in [1, 2, 3, 7, 64] {
            let doc = parse_document(
                ReadSource::with_chunk_size(text.as_bytes(), size),
                &ParseOptions::new(MergePolicy::ReplaceInPlace),
            )
            .unwrap();
            assert_eq!(doc, expected, "chunk size {size}");
        }
    }

    fn ini_text() -> impl Strategy<Value = String> {
        let line = prop_oneof![
            Just(String::new()),
            Just("  ".to_string()),
            "[a-c]{1,3}".prop_map(|s| format!("[{s}]")),
            "[a-cA-C]{1,2}".prop_map(|k| format!("{k} = v")),
            "[a-c]{1,2}".prop_map(|k| format!("\t{k}={k}\t")),
            Just("; note".to_string()),
            Just("# other".to_string()),
        ];
        (
            proptest::collection::vec(line, 0..12),
            prop_oneof![Just("\n"), Just("\r\n")],
            any::<bool>(),
        )
            .prop_map(|(lines, eol, trailing)| {
                let mut text = lines.join(eol);
                if trailing && !text.is_empty() {
                    text.push_str(eol);
                }
                text
            })
    }

    proptest! {
        #[test]
        fn prop_chunking_does_not_change_lines(
            text in ini_text(),
            cuts in proptest::collection::vec(any::<prop::sample::Index>(), 0..6),
        ) {
            let bytes = text.as_bytes();
            let mut offsets: Vec<usize> = cuts.iter().map(|i| i.index(bytes.len() + 1)).collect();
            offsets.sort_unstable();

            let mut chunks = vec![];
            let mut start = 0;
            for end in offsets {
                chunks.push(&bytes[start..end]);
                start = end;
            }
            chunks.push(&bytes[start..]);

            let whole: Vec<Line> = LineReader::new(IterSource::new([bytes]))
                .collect::<Result<_, _>>()
                .unwrap();
            prop_assert_eq!(classify_chunks(&chunks), whole);
        }

        #[test]
        fn prop_merged_document_has_unique_keys(text in ini_text()) {
            for policy in [MergePolicy::KeepFirst, MergePolicy::KeepLast, MergePolicy::ReplaceInPlace] {
                let doc = parse_str(&text, policy).unwrap();
                let mut names: Vec<String> = doc.sections().iter().map(|s| s.name().to_lowercase()).collect();
                names.sort();
                names.dedup();
                prop_assert_eq!(names.len(), doc.sections().len());

                for section in doc.sections() {
                    let mut keys: Vec<String> = section.properties().map(|(k, _)| k.to_lowercase()).collect();
                    let total = keys.len();
                    keys.sort();
                    keys.dedup();
                    prop_assert_eq!(keys.len(), total);
                }
            }
        }

        #[test]
        fn prop_merging_is_idempotent(text in ini_text()) {
            let once = render_to_string(&parse_str(&text, MergePolicy::ReplaceInPlace).unwrap(), LineEnding::Lf);
            let twice = render_to_string(&parse_str(&once, MergePolicy::ReplaceInPlace).unwrap(), LineEnding::Lf);
            prop_assert_eq!(once, twice);
        }
    }
}
