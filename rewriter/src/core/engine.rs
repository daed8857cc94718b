//! Ordered rule application.

use crate::core::rule::{Rule, RuleOutcome};
use crate::core::types::{RuleReport, RuleStatus};

/// Result of running a rule list over one piece of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOutput {
    pub content: String,
    pub changed: bool,
    pub reports: Vec<RuleReport>,
}

impl EngineOutput {
    pub fn any_already_applied(&self) -> bool {
        self.reports
            .iter()
            .any(|report| report.status == RuleStatus::AlreadyApplied)
    }
}

/// Apply `rules` in order, feeding each rule the previous rule's output.
///
/// `changed` compares the final content with `original`, so a rule pair that
/// cancels out reports no change.
pub fn apply_rules(rules: &[Box<dyn Rule>], original: &str) -> EngineOutput {
    let mut content = original.to_string();
    let mut reports = Vec::with_capacity(rules.len());
    for rule in rules {
        let status = match rule.apply(&content) {
            RuleOutcome::Changed(next) if next != content => {
                content = next;
                RuleStatus::Changed
            }
            RuleOutcome::Changed(_) | RuleOutcome::NoAnchor => RuleStatus::NoAnchor,
            RuleOutcome::AlreadyApplied => RuleStatus::AlreadyApplied,
        };
        reports.push(RuleReport {
            rule: rule.name().to_string(),
            status,
        });
    }
    let changed = content != original;
    EngineOutput {
        content,
        changed,
        reports,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Append(&'static str);

    impl Rule for Append {
        fn name(&self) -> &'static str {
            "append"
        }

        fn apply(&self, content: &str) -> RuleOutcome {
            if content.ends_with(self.0) {
                RuleOutcome::AlreadyApplied
            } else {
                RuleOutcome::Changed(format!("{content}{}", self.0))
            }
        }
    }

    struct Noop;

    impl Rule for Noop {
        fn name(&self) -> &'static str {
            "noop"
        }

        fn apply(&self, content: &str) -> RuleOutcome {
            RuleOutcome::Changed(content.to_string())
        }
    }

    #[test]
    fn rules_run_in_order_and_thread_content() {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(Append("a")), Box::new(Append("b"))];
        let out = apply_rules(&rules, "x");
        assert_eq!(out.content, "xab");
        assert!(out.changed);
        assert_eq!(out.reports[0].status, RuleStatus::Changed);
        assert_eq!(out.reports[1].status, RuleStatus::Changed);
    }

    #[test]
    fn second_application_is_a_no_op() {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(Append("!"))];
        let first = apply_rules(&rules, "hi");
        let second = apply_rules(&rules, &first.content);
        assert!(!second.changed);
        assert_eq!(second.content, first.content);
        assert!(second.any_already_applied());
    }

    #[test]
    fn identical_output_is_not_reported_as_change() {
        let rules: Vec<Box<dyn Rule>> = vec![Box::new(Noop)];
        let out = apply_rules(&rules, "same");
        assert!(!out.changed);
        assert_eq!(out.reports[0].status, RuleStatus::NoAnchor);
    }
}
