//! The transformation rule contract.

/// What a rule did with the content it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    /// The rule rewrote the content.
    Changed(String),
    /// The rule's idempotency guard found its change already in place.
    AlreadyApplied,
    /// The anchor the rule looks for is absent (or malformed); nothing to do.
    NoAnchor,
}

/// A pure, idempotent content transformation.
///
/// Implementations must satisfy `apply(apply(x)) == apply(x)`: once a rule
/// returns `Changed(y)`, applying it to `y` must not return `Changed`.
pub trait Rule {
    /// Stable identifier used in logs and reports.
    fn name(&self) -> &'static str;

    fn apply(&self, content: &str) -> RuleOutcome;
}
