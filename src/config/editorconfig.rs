//! Line ending hint from the nearest .editorconfig

use std::fs::File;
use std::path::{Path, PathBuf};

use super::file::find_file_upward;
use crate::document::MergePolicy;
use crate::error::Error;
use crate::pipeline::{parse_document, ParseOptions};
use crate::scanner::ReadSource;
use crate::serialize::LineEnding;

/// Find .editorconfig by searching upward from the given directory.
pub fn find_editorconfig(start_dir: &Path) -> Option<PathBuf> {
    find_file_upward(start_dir, ".editorconfig", false)
}

/// `end_of_line` from the `[*]` section, if it names an ending inimerge writes.
///
/// Later assignments win, as editorconfig readers apply them. `cr` and
/// unknown values yield `None`.
pub fn editorconfig_line_ending(path: &Path) -> Result<Option<LineEnding>, Error> {
    let file = File::open(path).map_err(Error::Source)?;
    let document = parse_document(
        ReadSource::new(file),
        &ParseOptions::new(MergePolicy::ReplaceInPlace),
    )?;

    Ok(document
        .section("*")
        .and_then(|section| section.get("end_of_line"))
        .and_then(|value| value.parse().ok()))
}
