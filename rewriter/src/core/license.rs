//! License header insertion.

use crate::core::rule::{Rule, RuleOutcome};

/// Prepend `header` to any file that does not already contain `marker`.
#[derive(Debug, Clone)]
pub struct LicenseHeader {
    marker: String,
    header: String,
}

impl LicenseHeader {
    pub fn new(marker: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            marker: marker.into(),
            header: header.into(),
        }
    }
}

impl Rule for LicenseHeader {
    fn name(&self) -> &'static str {
        "license-header"
    }

    fn apply(&self, content: &str) -> RuleOutcome {
        if content.contains(&self.marker) {
            return RuleOutcome::AlreadyApplied;
        }
        let mut out = String::with_capacity(self.header.len() + content.len());
        out.push_str(&self.header);
        out.push_str(content);
        RuleOutcome::Changed(out)
    }
}
