//! Merge repeated sections and keys in INI-style files.
//!
//! Input is read in chunks of any size and split into lines
//! ([`scanner`]), each line is classified ([`line`]), folded into a
//! [`Document`] ([`document`]) and written back ([`serialize`]).

pub mod atomic;
pub mod bytes;
pub mod colors;
pub mod config;
pub mod document;
pub mod error;
pub mod line;
mod output;
pub mod pipeline;
pub mod progress;
pub mod scanner;
pub mod serialize;
pub mod walker;

pub use bytes::{trim, trim_end, trim_start, ByteSeq};
pub use colors::{should_use_colors, Colors};
pub use config::{
    editorconfig_line_ending, find_config_file, find_editorconfig, generate_init_file,
    load_config, merge_config, CliMergeOptions, ConfigError, InimergeToml, MergeConfig,
    MergeSection, INIMERGE_TOML_TEMPLATE,
};
pub use document::{Document, DocumentBuilder, MergePolicy, MergeStats, Section, GLOBAL_SECTION};
pub use error::{Error, FormatError, FormatErrorKind};
pub use line::{classify, Line};
pub use output::{print_diff, Config, OutputContext, OutputMode, RunResult};
pub use pipeline::{
    parse_document, parse_document_observed, parse_str, LineObserver, LineReader, ParseOptions,
    TracingObserver,
};
pub use progress::ProgressReporter;
pub use scanner::{CancelToken, ChunkSource, IterSource, LineScanner, RawLine, ReadSource};
pub use serialize::{render_to_string, write_document, LineEnding};
pub use walker::walk_paths;

use std::fs;
use std::io;
use std::path::Path;

const BINARY_CHECK_SIZE: usize = 8192;

/// Check if content is binary by looking for null bytes in first 8192 bytes
pub fn is_binary(content: &[u8]) -> bool {
    let check_len = content.len().min(BINARY_CHECK_SIZE);
    content[..check_len].contains(&0)
}

/// What [`merge_file`] did with one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Skipped(&'static str),
    Unchanged,
    Changed {
        original: String,
        merged: String,
        stats: MergeStats,
    },
}

/// Merge one file in place.
///
/// With `write` false nothing is touched and a would-be change is still
/// reported as [`FileOutcome::Changed`]. A format error or cancellation leaves
/// the file as it was.
pub fn merge_file(
    path: &Path,
    config: &MergeConfig,
    cancel: &CancelToken,
    write: bool,
) -> Result<FileOutcome, Error> {
    let bytes = fs::read(path).map_err(Error::Source)?;

    if bytes.is_empty() {
        return Ok(FileOutcome::Skipped("empty"));
    }
    if is_binary(&bytes) {
        return Ok(FileOutcome::Skipped("binary"));
    }
    let Ok(original) = String::from_utf8(bytes) else {
        return Ok(FileOutcome::Skipped("non-UTF-8"));
    };

    let options = ParseOptions::new(config.policy).with_cancel(cancel.clone());
    let source = ReadSource::with_chunk_size(original.as_bytes(), config.chunk_size);
    let document = parse_document_observed(source, &options, &mut TracingObserver)?;

    let merged = render_to_string(&document, config.line_ending);
    if merged == original {
        return Ok(FileOutcome::Unchanged);
    }

    if write {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        atomic::write_atomic(path, |file| {
            write_document(&document, file, config.line_ending)
        })
        .map_err(Error::Sink)?;
        tracing::debug!(path = %path.display(), "rewrote file");
    }

    Ok(FileOutcome::Changed {
        original,
        merged,
        stats: document.stats(),
    })
}

/// Main entry point: process all files in given paths
pub fn run(
    paths: &[String],
    config: &Config,
    ctx: &OutputContext,
    cancel: &CancelToken,
) -> io::Result<RunResult> {
    let mut result = RunResult::default();

    // Count files for progress bar (2-pass approach)
    let file_count: u64 = walk_paths(paths).filter_map(|r| r.ok()).count() as u64;

    let progress = ProgressReporter::new(file_count, ctx.show_progress);

    for path in walk_paths(paths) {
        let path = path?;

        if cancel.is_cancelled() {
            result.cancelled = true;
            break;
        }

        if let Some(name) = path.file_name() {
            progress.set_message(&name.to_string_lossy());
        }

        match merge_file(&path, &config.merge, cancel, !config.check_only) {
            Ok(FileOutcome::Skipped(reason)) => {
                if ctx.verbose {
                    output::print_skipped(&path, reason, ctx);
                }
            }
            Ok(FileOutcome::Unchanged) => {
                if ctx.verbose {
                    output::print_checked(&path, ctx);
                }
            }
            Ok(FileOutcome::Changed {
                original,
                merged,
                stats,
            }) => {
                if config.check_only {
                    result.files_with_problems += 1;
                    output::print_check_result(&path, &original, &merged, &stats, ctx);
                } else {
                    result.files_changed += 1;
                    output::print_fix_result(&path, &original, &merged, &stats, ctx);
                }
            }
            Err(e) if e.is_cancelled() => {
                tracing::debug!(path = %path.display(), "cancelled");
                result.cancelled = true;
                break;
            }
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "failed to merge");
                result.files_failed += 1;
                if ctx.mode != OutputMode::Quiet {
                    progress.println(&output::format_failure(&path, &e, ctx));
                }
            }
        }

        progress.inc();
    }

    progress.finish();

    output::print_summary(&result, config, ctx);

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_detect_binary_with_null_byte() {
        assert!(is_binary(b"a = 1\x00\n"));
    }

    #[test]
    fn test_non_binary_text() {
        assert!(!is_binary(b"[section]\nkey = value\n"));
    }

    #[test]
    fn test_binary_null_after_8192_bytes_not_detected() {
        let mut content = vec![b'a'; 9000];
        content.push(0);
        assert!(!is_binary(&content));
    }

    #[test]
    fn test_merge_file_rewrites_duplicates() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "[a]\nx=1\n[A]\nx=2\ny=3\n").unwrap();

        let config = MergeConfig {
            policy: MergePolicy::ReplaceInPlace,
            chunk_size: 4,
            ..Default::default()
        };
        let outcome = merge_file(&path, &config, &CancelToken::new(), true).unwrap();

        let expected = MergeStats {
            repeated_sections: 1,
            repeated_keys: 1,
        };
        assert!(matches!(outcome, FileOutcome::Changed { stats, .. } if stats == expected));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[a]\nx = 2\ny = 3\n");
    }

    #[test]
    fn test_merge_file_check_only_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "a=1\na=2\n").unwrap();

        let outcome =
            merge_file(&path, &MergeConfig::default(), &CancelToken::new(), false).unwrap();

        assert!(matches!(outcome, FileOutcome::Changed { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a=1\na=2\n");
    }

    #[test]
    fn test_merge_file_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "; ok\n[a]\nx = 1\n").unwrap();

        let outcome =
            merge_file(&path, &MergeConfig::default(), &CancelToken::new(), true).unwrap();
        assert_eq!(outcome, FileOutcome::Unchanged);
    }

    #[test]
    fn test_merge_file_crlf_output() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "a=1\n").unwrap();

        let config = MergeConfig {
            line_ending: LineEnding::CrLf,
            ..Default::default()
        };
        merge_file(&path, &config, &CancelToken::new(), true).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "a = 1\r\n");
    }

    #[test]
    fn test_merge_file_format_error_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.ini");
        fs::write(&path, "a=1\n[broken\n").unwrap();

        let err =
            merge_file(&path, &MergeConfig::default(), &CancelToken::new(), true).unwrap_err();
        assert_eq!(err.as_format().map(|e| e.line), Some(2));
        assert_eq!(fs::read_to_string(&path).unwrap(), "a=1\n[broken\n");
    }

    #[test]
    fn test_merge_file_cancelled_leaves_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.ini");
        fs::write(&path, "a=1\na=2\n").unwrap();

        let cancel = CancelToken::new();
        cancel.cancel();
        let err = merge_file(&path, &MergeConfig::default(), &cancel, true).unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(fs::read_to_string(&path).unwrap(), "a=1\na=2\n");
    }

    #[test]
    fn test_merge_file_skips_binary_and_empty() {
        let dir = TempDir::new().unwrap();
        let binary = dir.path().join("blob.ini");
        fs::write(&binary, b"a=1\x00").unwrap();
        let empty = dir.path().join("empty.ini");
        fs::write(&empty, b"").unwrap();

        let config = MergeConfig::default();
        let cancel = CancelToken::new();
        assert_eq!(
            merge_file(&binary, &config, &cancel, true).unwrap(),
            FileOutcome::Skipped("binary")
        );
        assert_eq!(
            merge_file(&empty, &config, &cancel, true).unwrap(),
            FileOutcome::Skipped("empty")
        );
    }

    #[test]
    fn test_merge_file_missing_is_source_error() {
        let dir = TempDir::new().unwrap();
        let err = merge_file(
            &dir.path().join("nope.ini"),
            &MergeConfig::default(),
            &CancelToken::new(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Source(_)));
    }
}
