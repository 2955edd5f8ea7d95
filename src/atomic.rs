//! Replace a file's contents without leaving a half-written file behind.

use std::fs::{self, File};
use std::io;
use std::path::Path;

use tempfile::Builder;

/// Write through `write` into a randomly named temp file next to `path`,
/// sync it, then move it over `path` in one rename.
///
/// The original file's permissions are carried over. If `write` fails the
/// temp file is removed and `path` is untouched.
pub fn write_atomic<F>(path: &Path, write: F) -> io::Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut temp = Builder::new()
        .prefix(&format!(".{name}-"))
        .suffix(".tmp")
        .tempfile_in(dir)?;

    write(temp.as_file_mut())?;
    temp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(path) {
        temp.as_file().set_permissions(metadata.permissions())?;
    }

    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
