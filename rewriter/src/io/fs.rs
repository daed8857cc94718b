//! Filesystem seam used by the writer.
//!
//! Production code uses [`StdFileSystem`]; tests substitute an implementation
//! that fails selected operations to exercise the restore path.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

pub trait FileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Create or truncate `path`, write `contents` and flush them to disk.
    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()>;

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    fn remove(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Copy permission bits from `from` onto `to`.
    fn copy_permissions(&self, from: &Path, to: &Path) -> io::Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StdFileSystem;

impl FileSystem for StdFileSystem {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        fs::read(path)
    }

    fn write(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        let mut file = fs::File::create(path)?;
        file.write_all(contents)?;
        file.sync_all()
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn copy_permissions(&self, from: &Path, to: &Path) -> io::Result<()> {
        let permissions = fs::metadata(from)?.permissions();
        fs::set_permissions(to, permissions)
    }
}
