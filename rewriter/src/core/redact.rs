//! Redaction of string values assigned to sensitive `#define` macros.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::rule::{Rule, RuleOutcome};

/// `[indent][// ]#define NAME "value" ["more"...]`, capturing everything before
/// the opening quote as `lead` so it can be written back untouched. Adjacent
/// literals after the first are captured as `tail`.
static DEFINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?P<lead>[ \t]*(?P<comment>//[ \t]*)?#[ \t]*define[ \t]+(?P<name>[A-Za-z_][A-Za-z0-9_]*)[ \t]+)"(?P<value>(?:[^"\\\r\n]|\\.)*)"(?P<tail>(?:[ \t]*"(?:[^"\\\r\n]|\\.)*")*)"#,
    )
    .unwrap()
});

/// Replace the quoted value of every denylisted macro with `sentinel`.
///
/// The whole string value, including adjacent literals, collapses to a single
/// quoted sentinel; the directive, name, spacing and anything after the last
/// literal (such as a trailing comment) are kept.
#[derive(Debug, Clone)]
pub struct SensitiveMacros {
    denylist: BTreeSet<String>,
    sentinel: String,
    include_commented: bool,
}

impl SensitiveMacros {
    pub fn new<I, S>(denylist: I, sentinel: impl Into<String>, include_commented: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            denylist: denylist.into_iter().map(Into::into).collect(),
            sentinel: sentinel.into(),
            include_commented,
        }
    }
}

impl Rule for SensitiveMacros {
    fn name(&self) -> &'static str {
        "sensitive-macro-redaction"
    }

    fn apply(&self, content: &str) -> RuleOutcome {
        let mut out = String::with_capacity(content.len());
        let mut redacted = 0usize;
        let mut already = 0usize;

        for line in content.split_inclusive('\n') {
            let Some(caps) = DEFINE_RE.captures(line) else {
                out.push_str(line);
                continue;
            };
            let listed = self.denylist.contains(&caps["name"]);
            let commented = caps.name("comment").is_some();
            if !listed || (commented && !self.include_commented) {
                out.push_str(line);
                continue;
            }
            if caps["value"] == *self.sentinel && caps["tail"].is_empty() {
                already += 1;
                out.push_str(line);
                continue;
            }
            let whole = caps.get(0).map_or(0, |m| m.end());
            out.push_str(&caps["lead"]);
            out.push('"');
            out.push_str(&self.sentinel);
            out.push('"');
            out.push_str(&line[whole..]);
            redacted += 1;
        }

        if redacted > 0 {
            RuleOutcome::Changed(out)
        } else if already > 0 {
            RuleOutcome::AlreadyApplied
        } else {
            RuleOutcome::NoAnchor
        }
    }
}
