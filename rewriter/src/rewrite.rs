//! One rewrite pass: walk, apply rules, commit with backup.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, error, info, instrument, warn};

use crate::core::task::FileTask;
use crate::core::types::{FileState, RuleReport};
use crate::io::config::RewriterConfig;
use crate::io::fs::FileSystem;
use crate::io::walker::candidates;
use crate::io::writer::{CommitSettings, commit};
use crate::ruleset::RuleSet;
use crate::summary::{FileReport, PassSummary};

#[derive(Debug, Clone)]
pub struct PassOptions {
    /// Compute and report changes without touching the filesystem.
    pub dry_run: bool,
    pub commit: CommitSettings,
    /// Checked before each file; once set, the pass stops.
    pub cancel: Arc<AtomicBool>,
}

impl PassOptions {
    pub fn from_config(cfg: &RewriterConfig, dry_run: bool) -> Self {
        Self {
            dry_run,
            commit: CommitSettings {
                backup_suffix: cfg.backup_suffix.clone(),
                temp_suffix: cfg.temp_suffix.clone(),
            },
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    fn ignored_suffixes(&self) -> Vec<String> {
        vec![
            self.commit.backup_suffix.clone(),
            self.commit.temp_suffix.clone(),
        ]
    }
}

/// Run `set` over every candidate file under each of `roots`.
///
/// Failures are per file: they are logged, recorded in the summary and the
/// pass moves on. Roots that do not exist are skipped with a warning.
#[instrument(skip_all, fields(rule_set = set.name, dry_run = options.dry_run))]
pub fn run_pass<F: FileSystem + ?Sized>(
    roots: &[PathBuf],
    set: &RuleSet,
    fs: &F,
    options: &PassOptions,
) -> PassSummary {
    let mut summary = PassSummary::new(set.name, options.dry_run);
    let ignored = options.ignored_suffixes();

    'roots: for root in roots {
        if !root.exists() {
            warn!(root = %root.display(), "root does not exist, skipping");
            continue;
        }
        debug!(root = %root.display(), "walking root");
        for path in candidates(root, &set.filter, &ignored) {
            if options.cancel.load(Ordering::Relaxed) {
                warn!("pass cancelled");
                summary.cancelled = true;
                break 'roots;
            }
            summary.record(process_file(&path, set, fs, options));
        }
    }

    info!(
        scanned = summary.scanned,
        changed = summary.changed,
        skipped = summary.skipped,
        failed = summary.failed,
        "pass finished"
    );
    summary
}

fn process_file<F: FileSystem + ?Sized>(
    path: &Path,
    set: &RuleSet,
    fs: &F,
    options: &PassOptions,
) -> FileReport {
    let original = match fs.read(path) {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(path = %path.display(), err = %err, "read failed");
            return failed(path, FileState::ReadFailed, Vec::new(), err.to_string());
        }
    };

    let mut task = FileTask::new(path.to_path_buf(), original);
    task.apply(&set.rules);
    for report in &task.reports {
        debug!(path = %path.display(), rule = %report.rule, status = ?report.status, "rule applied");
    }

    if !task.changed {
        let state = if task.already_applied {
            FileState::Skipped
        } else {
            FileState::Unchanged
        };
        return FileReport {
            path: task.path,
            state,
            rules: task.reports,
            backup: None,
            error: None,
        };
    }

    let bytes = match task.encoded() {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(path = %path.display(), err = %err, "cannot re-encode rewritten text");
            return failed(path, FileState::EncodingFailed, task.reports, err.to_string());
        }
    };

    if options.dry_run {
        info!(path = %path.display(), "would change");
        return FileReport {
            path: task.path,
            state: FileState::DryRun,
            rules: task.reports,
            backup: None,
            error: None,
        };
    }

    match commit(fs, &options.commit, path, &task.original, &bytes) {
        Ok(backup) => {
            info!(path = %path.display(), backup = %backup.display(), "file rewritten");
            FileReport {
                path: task.path,
                state: FileState::Committed,
                rules: task.reports,
                backup: Some(backup),
                error: None,
            }
        }
        Err(err) => {
            error!(path = %path.display(), err = %err, "commit failed");
            let state = err.state();
            failed(path, state, task.reports, err.to_string())
        }
    }
}

fn failed(path: &Path, state: FileState, rules: Vec<RuleReport>, error: String) -> FileReport {
    FileReport {
        path: path.to_path_buf(),
        state,
        rules,
        backup: None,
        error: Some(error),
    }
}
