//! Side-effecting helpers: configuration, directory walking and backup-and-commit
//! writes.

pub mod backups;
pub mod config;
pub mod fs;
pub mod walker;
pub mod writer;
