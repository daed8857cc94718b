//! Shared deterministic types for the rewrite pipeline.
//!
//! These types are the stable contract between the rule engine, the writer and
//! the pass summary. They carry no I/O handles.

use serde::{Deserialize, Serialize};

/// Per-rule result recorded for a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleStatus {
    Changed,
    AlreadyApplied,
    NoAnchor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleReport {
    pub rule: String,
    pub status: RuleStatus,
}

/// Terminal state of one file in a pass.
///
/// A file moves `scanned -> rules applied`, then ends in exactly one of these.
/// The changed path is `change pending -> backed up -> committed`; it can stop at
/// `BackupFailed`, or at `RestoredFromBackup` / `RestoreFailed` when the commit
/// write fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileState {
    /// No rule found anything to do.
    Unchanged,
    /// No change, and at least one rule reported its change already in place.
    Skipped,
    /// A change was computed but the pass was a dry run.
    DryRun,
    Committed,
    ReadFailed,
    EncodingFailed,
    BackupFailed,
    /// The commit write failed and the original content was put back.
    RestoredFromBackup,
    /// The commit write failed and restoring the original failed too.
    RestoreFailed,
}

impl FileState {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            FileState::ReadFailed
                | FileState::EncodingFailed
                | FileState::BackupFailed
                | FileState::RestoredFromBackup
                | FileState::RestoreFailed
        )
    }

    pub fn is_change(self) -> bool {
        matches!(self, FileState::Committed | FileState::DryRun)
    }
}
