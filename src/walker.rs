use ignore::WalkBuilder;
use std::io;
use std::path::{Path, PathBuf};

/// True for files inimerge picks up when expanding a directory
pub fn is_ini_file(path: &Path) -> bool {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(".editorconfig") => true,
        Some(_) => path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("ini")),
        None => false,
    }
}

/// Walk paths and yield INI-style files, respecting gitignore.
///
/// Files named directly are always yielded; files found inside directories
/// must pass [`is_ini_file`].
pub fn walk_paths(paths: &[String]) -> impl Iterator<Item = io::Result<PathBuf>> {
    let mut all_files = vec![];

    for path in paths {
        let walker = WalkBuilder::new(path)
            .hidden(false) // .editorconfig is a dotfile
            .git_ignore(true)
            .git_global(true)
            .git_exclude(true)
            .filter_entry(|entry| entry.file_name() != ".git")
            .build();

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let is_file = entry.file_type().is_some_and(|ft| ft.is_file());
                    if is_file && (entry.depth() == 0 || is_ini_file(entry.path())) {
                        all_files.push(Ok(entry.into_path()));
                    }
                }
                Err(e) => {
                    all_files.push(Err(io::Error::other(e.to_string())));
                }
            }
        }
    }

    all_files.into_iter()
}
