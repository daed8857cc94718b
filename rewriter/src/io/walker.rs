//! Depth-first discovery of candidate files.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::core::filter::FileFilter;

/// Candidate files under `root` that pass `filter`.
///
/// The walk is lazy, does not follow symlinks and visits siblings in file-name
/// order. Entries that cannot be read (for example a directory without read
/// permission) are logged and skipped. Names ending in any of `ignore_suffixes`
/// (backups, temp files) are never yielded. Calling `candidates` again starts a
/// fresh walk.
pub fn candidates<'a>(
    root: &Path,
    filter: &'a FileFilter,
    ignore_suffixes: &'a [String],
) -> impl Iterator<Item = PathBuf> + 'a {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(err) => {
                let path = err.path().map(|p| p.display().to_string());
                warn!(path = ?path, err = %err, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(move |path| !is_ignored(path, ignore_suffixes))
        .filter(move |path| {
            let matched = filter.matches(path);
            if matched {
                debug!(path = %path.display(), "candidate");
            }
            matched
        })
}

fn is_ignored(path: &Path, suffixes: &[String]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())))
}
