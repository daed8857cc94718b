//! Test-only helpers: fixture trees and a filesystem that fails on demand.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::io::fs::{FileSystem, StdFileSystem};

/// Write `files` (relative path, content) under `root`, creating directories.
pub fn write_tree(root: &Path, files: &[(&str, &str)]) -> Vec<PathBuf> {
    files
        .iter()
        .map(|(rel, content)| {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("create fixture dir");
            }
            fs::write(&path, content).expect("write fixture file");
            path
        })
        .collect()
}

/// Fresh temp directory populated with `files`.
pub fn fixture_tree(files: &[(&str, &str)]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    write_tree(dir.path(), files);
    dir
}

/// Read a fixture file as UTF-8.
pub fn read(path: &Path) -> String {
    fs::read_to_string(path).expect("read fixture file")
}

/// [`StdFileSystem`] that fails selected operations.
///
/// Names are matched as file-name suffixes, so `"a.h.tmp"` targets the temp
/// file of `a.h` in any directory.
#[derive(Debug, Default, Clone)]
pub struct FaultyFileSystem {
    /// Fail `write` for these targets without creating them.
    pub fail_write: Vec<String>,
    /// Fail `rename` when the source matches.
    pub fail_rename_from: Vec<String>,
    /// Truncate the rename target before failing, simulating a rename that
    /// damaged the destination.
    pub clobber_on_failed_rename: bool,
}

fn name_matches(path: &Path, suffixes: &[String]) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| suffixes.iter().any(|suffix| name.ends_with(suffix.as_str())))
}

fn injected(op: &str, path: &Path) -> io::Error {
    io::Error::other(format!("injected {op} failure for {}", path.display()))
}

impl FileSystem for FaultyFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        StdFileSystem.read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        if name_matches(path, &self.fail_write) {
            return Err(injected("write", path));
        }
        StdFileSystem.write(path, contents)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        if name_matches(from, &self.fail_rename_from) {
            if self.clobber_on_failed_rename {
                StdFileSystem.write(to, b"")?;
            }
            return Err(injected("rename", from));
        }
        StdFileSystem.rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        StdFileSystem.remove(path)
    }

    fn exists(&self, path: &Path) -> bool {
        StdFileSystem.exists(path)
    }

    fn copy_permissions(&self, from: &Path, to: &Path) -> io::Result<()> {
        StdFileSystem.copy_permissions(from, to)
    }
}
