//! Per-file reports and the aggregate summary of a pass.

use std::fmt::Write as _;
use std::path::PathBuf;

use serde::Serialize;

use crate::core::types::{FileState, RuleReport};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub state: FileState,
    pub rules: Vec<RuleReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Counts and per-file results for one rule set over one or more roots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassSummary {
    pub rule_set: String,
    pub dry_run: bool,
    pub scanned: usize,
    /// Committed, or would be committed in a dry run.
    pub changed: usize,
    /// Left alone because a rule found its change already in place.
    pub skipped: usize,
    pub unchanged: usize,
    pub failed: usize,
    pub cancelled: bool,
    pub files: Vec<FileReport>,
}

impl PassSummary {
    pub fn new(rule_set: &str, dry_run: bool) -> Self {
        Self {
            rule_set: rule_set.to_string(),
            dry_run,
            ..Self::default()
        }
    }

    pub fn record(&mut self, report: FileReport) {
        self.scanned += 1;
        match report.state {
            state if state.is_failure() => self.failed += 1,
            state if state.is_change() => self.changed += 1,
            FileState::Skipped => self.skipped += 1,
            _ => self.unchanged += 1,
        }
        self.files.push(report);
    }

    pub fn failures(&self) -> impl Iterator<Item = &FileReport> {
        self.files.iter().filter(|report| report.state.is_failure())
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

fn state_label(state: FileState) -> &'static str {
    match state {
        FileState::Unchanged => "unchanged",
        FileState::Skipped => "skipped",
        FileState::DryRun => "would change",
        FileState::Committed => "changed",
        FileState::ReadFailed => "read failed",
        FileState::EncodingFailed => "encoding failed",
        FileState::BackupFailed => "backup failed",
        FileState::RestoredFromBackup => "write failed, restored",
        FileState::RestoreFailed => "write failed, restore failed",
    }
}

/// Human-readable summary: one line per changed, skipped or failed file, then
/// totals.
pub fn render_text(summary: &PassSummary) -> String {
    let mut out = String::new();
    for report in &summary.files {
        if report.state == FileState::Unchanged {
            continue;
        }
        let _ = write!(
            out,
            "{}: {}",
            state_label(report.state),
            report.path.display()
        );
        if let Some(err) = &report.error {
            let _ = write!(out, " ({err})");
        }
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "{}{}: scanned {}, changed {}, skipped {}, unchanged {}, failed {}",
        summary.rule_set,
        if summary.dry_run { " (dry run)" } else { "" },
        summary.scanned,
        summary.changed,
        summary.skipped,
        summary.unchanged,
        summary.failed,
    );
    if summary.cancelled {
        out.push_str("pass cancelled before all files were visited\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(path: &str, state: FileState) -> FileReport {
        FileReport {
            path: PathBuf::from(path),
            state,
            rules: Vec::new(),
            backup: None,
            error: None,
        }
    }

    #[test]
    fn record_buckets_each_state_once() {
        let mut summary = PassSummary::new("license", false);
        summary.record(report("a.h", FileState::Committed));
        summary.record(report("b.h", FileState::Skipped));
        summary.record(report("c.h", FileState::Unchanged));
        summary.record(report("d.h", FileState::BackupFailed));
        summary.record(report("e.h", FileState::DryRun));

        assert_eq!(summary.scanned, 5);
        assert_eq!(summary.changed, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.unchanged, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures().count(), 1);
    }

    #[test]
    fn render_lists_changed_skipped_and_failed_files() {
        let mut summary = PassSummary::new("redact", true);
        summary.record(report("a.h", FileState::DryRun));
        summary.record(report("b.h", FileState::Unchanged));
        summary.record(report("s.h", FileState::Skipped));
        let mut failed = report("c.h", FileState::ReadFailed);
        failed.error = Some("permission denied".to_string());
        summary.record(failed);

        let text = render_text(&summary);
        assert!(text.contains("would change: a.h\n"));
        assert!(!text.contains("b.h"));
        assert!(text.contains("skipped: s.h\n"));
        assert!(text.contains("read failed: c.h (permission denied)\n"));
        assert!(text.contains(
            "redact (dry run): scanned 4, changed 1, skipped 1, unchanged 1, failed 1"
        ));
    }

    #[test]
    fn json_omits_empty_optionals() {
        let mut summary = PassSummary::new("license", false);
        summary.record(report("a.h", FileState::Unchanged));
        let json = serde_json::to_value(&summary).expect("json");
        assert_eq!(json["files"][0]["state"], "unchanged");
        assert!(json["files"][0].get("backup").is_none());
    }
}
