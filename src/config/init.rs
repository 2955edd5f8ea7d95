//! Template generation for `--init` command

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::file::CONFIG_FILE_NAME;

/// Template inimerge.toml with documentation
pub const INIMERGE_TOML_TEMPLATE: &str = r#"# inimerge.toml - Configuration for inimerge
#
# inimerge rewrites INI-style files (.editorconfig, *.ini) so that:
# - Repeated [section] headers are folded into the first one
# - Repeated keys inside a section appear only once
# - Comments and blank lines stay where they were
#
# Section names and keys are compared case-insensitively.

[merge]
# What to do when a key repeats inside a section:
#   keep-first        first occurrence wins, later ones are dropped
#   keep-last         later occurrence wins and moves to its own position
#   replace-in-place  first position is kept, later value wins
# Default: "replace-in-place"
# policy = "replace-in-place"

# Line terminator for rewritten files: "lf" or "crlf".
# Falls back to end_of_line in .editorconfig's [*] section, then "lf".
# line_ending = "lf"

# Bytes read per chunk.
# Default: 32768
# chunk_size = 32768
"#;

/// Generate inimerge.toml in the specified directory (or current directory if None).
///
/// Returns an error if inimerge.toml already exists.
pub fn generate_init_file_in(dir: Option<&Path>) -> io::Result<PathBuf> {
    let path = dir.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), |d| d.join(CONFIG_FILE_NAME));

    if path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{CONFIG_FILE_NAME} already exists"),
        ));
    }

    fs::write(&path, INIMERGE_TOML_TEMPLATE)?;
    Ok(path)
}

/// Generate inimerge.toml in the current directory.
pub fn generate_init_file() -> io::Result<PathBuf> {
    generate_init_file_in(None)
}
