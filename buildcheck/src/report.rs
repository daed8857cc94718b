//! Check results and how they are printed.

use std::fmt::Write as _;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    /// Worth a look but does not fail the run (optional env var, cache value).
    Warn,
    Fail,
}

impl CheckStatus {
    fn mark(self) -> &'static str {
        match self {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "FAIL",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Check {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    pub fn new(name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }

    pub fn pass(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Pass, detail)
    }

    pub fn warn(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Warn, detail)
    }

    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, CheckStatus::Fail, detail)
    }
}

/// Every check from one `buildcheck` invocation.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub command: String,
    pub generated_at: String,
    pub checks: Vec<Check>,
}

impl Report {
    pub fn new(command: &str, checks: Vec<Check>) -> Self {
        Self {
            command: command.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            checks,
        }
    }

    pub fn passed(&self) -> bool {
        self.checks
            .iter()
            .all(|check| check.status != CheckStatus::Fail)
    }

    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for check in &self.checks {
            let _ = writeln!(
                out,
                "[{:>4}] {}: {}",
                check.status.mark(),
                check.name,
                check.detail
            );
        }
        let failed = self
            .checks
            .iter()
            .filter(|check| check.status == CheckStatus::Fail)
            .count();
        let verdict = if failed == 0 { "PASSED" } else { "FAILED" };
        let _ = writeln!(
            out,
            "{}: {verdict} ({} checks, {failed} failed)",
            self.command,
            self.checks.len()
        );
        out
    }
}
