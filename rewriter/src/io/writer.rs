//! Backup-then-commit writes.
//!
//! A commit persists the original bytes to `<path><backup_suffix>` first, then
//! writes the new content to `<path><temp_suffix>` and renames it over the
//! original. The original path therefore always holds either the old or the new
//! content in full. If the commit fails, the original is checked against the
//! backup and put back when it is missing or different.

use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::core::types::FileState;
use crate::io::fs::FileSystem;

/// Sibling file names used during a commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSettings {
    pub backup_suffix: String,
    pub temp_suffix: String,
}

#[derive(Debug, Error)]
pub enum CommitError {
    #[error("back up {} to {}", .path.display(), .backup.display())]
    Backup {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("write {}; original content kept", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(
        "write {} failed and restoring it from {} also failed ({restore}); backup left in place",
        .path.display(),
        .backup.display()
    )]
    Restore {
        path: PathBuf,
        backup: PathBuf,
        #[source]
        source: io::Error,
        restore: io::Error,
    },
}

impl CommitError {
    /// Terminal file state this failure corresponds to.
    pub fn state(&self) -> FileState {
        match self {
            CommitError::Backup { .. } => FileState::BackupFailed,
            CommitError::Write { .. } => FileState::RestoredFromBackup,
            CommitError::Restore { .. } => FileState::RestoreFailed,
        }
    }
}

/// `path` with `suffix` appended to its file name (`a.h` + `.bak` = `a.h.bak`).
pub fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// Replace the content of `path` with `transformed`, keeping a backup of
/// `original`. Returns the backup path.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn commit<F: FileSystem + ?Sized>(
    fs: &F,
    settings: &CommitSettings,
    path: &Path,
    original: &[u8],
    transformed: &[u8],
) -> Result<PathBuf, CommitError> {
    let backup = sibling_path(path, &settings.backup_suffix);
    let backup_tmp = sibling_path(&backup, &settings.temp_suffix);
    let temp = sibling_path(path, &settings.temp_suffix);

    if fs.exists(&backup) {
        debug!(backup = %backup.display(), "overwriting existing backup");
    }
    if let Err(source) = fs
        .write(&backup_tmp, original)
        .and_then(|()| fs.rename(&backup_tmp, &backup))
    {
        discard(fs, &backup_tmp);
        return Err(CommitError::Backup {
            path: path.to_path_buf(),
            backup,
            source,
        });
    }
    debug!(backup = %backup.display(), "backup written");

    if let Err(source) = fs.write(&temp, transformed) {
        discard(fs, &temp);
        return Err(recover(fs, path, &backup, original, source));
    }
    if let Err(err) = fs.copy_permissions(path, &temp) {
        warn!(err = %err, "could not copy permissions onto rewritten file");
    }
    if let Err(source) = fs.rename(&temp, path) {
        discard(fs, &temp);
        return Err(recover(fs, path, &backup, original, source));
    }
    debug!("commit complete");
    Ok(backup)
}

/// Put the original back after a failed commit.
fn recover<F: FileSystem + ?Sized>(
    fs: &F,
    path: &Path,
    backup: &Path,
    original: &[u8],
    source: io::Error,
) -> CommitError {
    let intact = fs.read(path).is_ok_and(|current| current == original);
    if intact {
        // No change landed, so the backup has nothing to offer.
        discard(fs, backup);
        return CommitError::Write {
            path: path.to_path_buf(),
            source,
        };
    }
    warn!(path = %path.display(), "original damaged by failed commit, restoring from backup");
    match fs.rename(backup, path) {
        Ok(()) => CommitError::Write {
            path: path.to_path_buf(),
            source,
        },
        Err(restore) => CommitError::Restore {
            path: path.to_path_buf(),
            backup: backup.to_path_buf(),
            source,
            restore,
        },
    }
}

fn discard<F: FileSystem + ?Sized>(fs: &F, path: &Path) {
    if fs.exists(path)
        && let Err(err) = fs.remove(path)
    {
        warn!(path = %path.display(), err = %err, "failed to remove leftover file");
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::io::fs::StdFileSystem;
    use crate::test_support::FaultyFileSystem;

    fn settings() -> CommitSettings {
        CommitSettings {
            backup_suffix: ".bak".to_string(),
            temp_suffix: ".tmp".to_string(),
        }
    }

    #[test]
    fn sibling_path_appends_to_file_name() {
        assert_eq!(
            sibling_path(Path::new("src/a.h"), ".bak"),
            PathBuf::from("src/a.h.bak")
        );
    }

    #[test]
    fn commit_writes_content_and_backup() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("a.h");
        fs::write(&path, "old").expect("write");

        let backup = commit(&StdFileSystem, &settings(), &path, b"old", b"new").expect("commit");

        assert_eq!(fs::read(&path).expect("read"), b"new");
        assert_eq!(fs::read(&backup).expect("read backup"), b"old");
        assert!(!temp.path().join("a.h.tmp").exists());
        assert!(!temp.path().join("a.h.bak.tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn commit_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("run.sh");
        fs::write(&path, "old").expect("write");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");

        commit(&StdFileSystem, &settings(), &path, b"old", b"new").expect("commit");

        let mode = fs::metadata(&path).expect("meta").permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn backup_failure_leaves_original_untouched() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("a.h");
        fs::write(&path, "old").expect("write");
        let faulty = FaultyFileSystem {
            fail_write: vec![".bak.tmp".to_string()],
            ..FaultyFileSystem::default()
        };

        let err = commit(&faulty, &settings(), &path, b"old", b"new").expect_err("must fail");

        assert_eq!(err.state(), FileState::BackupFailed);
        assert_eq!(fs::read(&path).expect("read"), b"old");
        assert!(!temp.path().join("a.h.bak").exists());
    }

    #[test]
    fn temp_write_failure_keeps_original_and_drops_backup() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("a.h");
        fs::write(&path, "old").expect("write");
        let faulty = FaultyFileSystem {
            fail_write: vec!["a.h.tmp".to_string()],
            ..FaultyFileSystem::default()
        };

        let err = commit(&faulty, &settings(), &path, b"old", b"new").expect_err("must fail");

        assert_eq!(err.state(), FileState::RestoredFromBackup);
        assert_eq!(fs::read(&path).expect("read"), b"old");
        assert!(!temp.path().join("a.h.tmp").exists());
        assert!(!temp.path().join("a.h.bak").exists());
    }

    #[test]
    fn clobbered_original_is_restored_from_backup() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("a.h");
        fs::write(&path, "old").expect("write");
        let faulty = FaultyFileSystem {
            fail_rename_from: vec!["a.h.tmp".to_string()],
            clobber_on_failed_rename: true,
            ..FaultyFileSystem::default()
        };

        let err = commit(&faulty, &settings(), &path, b"old", b"new").expect_err("must fail");

        assert_eq!(err.state(), FileState::RestoredFromBackup);
        assert_eq!(fs::read(&path).expect("read"), b"old");
    }

    #[test]
    fn failed_restore_keeps_backup() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("a.h");
        fs::write(&path, "old").expect("write");
        let faulty = FaultyFileSystem {
            fail_rename_from: vec!["a.h.tmp".to_string(), "a.h.bak".to_string()],
            clobber_on_failed_rename: true,
            ..FaultyFileSystem::default()
        };

        let err = commit(&faulty, &settings(), &path, b"old", b"new").expect_err("must fail");

        assert_eq!(err.state(), FileState::RestoreFailed);
        assert_eq!(
            fs::read(temp.path().join("a.h.bak")).expect("backup kept"),
            b"old"
        );
        assert!(err.to_string().contains("a.h.bak"));
    }
}
