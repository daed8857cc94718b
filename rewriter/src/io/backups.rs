//! Removal of backup files left by earlier passes.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::core::filter::FileFilter;
use crate::io::walker::candidates;

/// Delete every file under `root` whose name ends with `backup_suffix`.
///
/// Returns the matched paths in walk order; with `dry_run` nothing is deleted.
/// Stops at the first file that cannot be removed.
pub fn clean_backups(root: &Path, backup_suffix: &str, dry_run: bool) -> Result<Vec<PathBuf>> {
    let filter = FileFilter::Suffixes(vec![backup_suffix.to_string()]);
    let mut removed = Vec::new();
    for path in candidates(root, &filter, &[]) {
        if !dry_run {
            fs::remove_file(&path)
                .with_context(|| format!("remove backup {}", path.display()))?;
            info!(path = %path.display(), "backup removed");
        }
        removed.push(path);
    }
    Ok(removed)
}
