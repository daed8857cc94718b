//! `cmake_minimum_required` version bump.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::cmake::{self, Invocation};
use crate::core::edit::{TextEdit, apply_edits};
use crate::core::rule::{Rule, RuleOutcome};

const COMMAND: &str = "cmake_minimum_required";

static VERSION_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(?i:VERSION)\s+([0-9][0-9A-Za-z.]*)(\s|$)").unwrap());

/// A dotted numeric version (`3.10`, `3.5.1`). Missing trailing components
/// compare as zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmakeVersion(Vec<u32>);

impl CmakeVersion {
    pub fn parse(raw: &str) -> Option<Self> {
        let parts = raw
            .split('.')
            .map(|part| part.parse::<u32>().ok())
            .collect::<Option<Vec<_>>>()?;
        if parts.is_empty() || parts.len() > 4 {
            return None;
        }
        Some(Self(parts))
    }

    fn component(&self, idx: usize) -> u32 {
        self.0.get(idx).copied().unwrap_or(0)
    }
}

impl PartialOrd for CmakeVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CmakeVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.0.len().max(other.0.len());
        (0..len)
            .map(|idx| self.component(idx).cmp(&other.component(idx)))
            .find(|ord| ord.is_ne())
            .unwrap_or(Ordering::Equal)
    }
}

/// Raise every `cmake_minimum_required(VERSION X.Y)` below the target to the
/// target. Higher versions, version ranges (`3.5...3.27`) and arguments that do
/// not parse are left as written.
#[derive(Debug, Clone)]
pub struct CmakeMinimumVersion {
    target: CmakeVersion,
    target_text: String,
}

impl CmakeMinimumVersion {
    /// Returns `None` when `target` is not a dotted numeric version.
    pub fn new(target: &str) -> Option<Self> {
        let parsed = CmakeVersion::parse(target)?;
        Some(Self {
            target: parsed,
            target_text: target.to_string(),
        })
    }

    /// Locate the version token inside an invocation: `(start, end, raw)`.
    fn version_token<'a>(text: &'a str, inv: &Invocation) -> Option<(usize, usize, &'a str)> {
        let args = inv.args(text)?;
        let caps = VERSION_ARG.captures(args)?;
        let token = caps.get(1)?;
        let base = inv.args_start();
        Some((base + token.start(), base + token.end(), token.as_str()))
    }
}

impl Rule for CmakeMinimumVersion {
    fn name(&self) -> &'static str {
        "cmake-minimum-version"
    }

    fn apply(&self, content: &str) -> RuleOutcome {
        let invocations = cmake::parse(content);
        let mut edits = Vec::new();
        let mut at_target = false;

        for inv in cmake::find(&invocations, COMMAND) {
            let Some((start, end, raw)) = Self::version_token(content, inv) else {
                continue;
            };
            if raw.contains("...") {
                continue;
            }
            let Some(found) = CmakeVersion::parse(raw) else {
                continue;
            };
            match found.cmp(&self.target) {
                Ordering::Less => edits.push(TextEdit::replace(start, end, &self.target_text)),
                Ordering::Equal if raw == self.target_text => at_target = true,
                Ordering::Equal | Ordering::Greater => {}
            }
        }

        if at_target {
            return RuleOutcome::AlreadyApplied;
        }
        if edits.is_empty() {
            return RuleOutcome::NoAnchor;
        }
        RuleOutcome::Changed(apply_edits(content, edits))
    }
}
