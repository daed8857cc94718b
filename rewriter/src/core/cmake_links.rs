//! Repair `target_link_libraries` calls whose last argument was split onto a
//! stray continuation line:
//!
//! ```text
//! target_link_libraries(app onesdk)
//!             ${PLATFORM_LIBS})
//! ```
//!
//! becomes `target_link_libraries(app onesdk ${PLATFORM_LIBS})`.

use crate::core::cmake;
use crate::core::edit::{TextEdit, apply_edits, content_end, line_end};
use crate::core::rule::{Rule, RuleOutcome};

const COMMAND: &str = "target_link_libraries";

#[derive(Debug, Clone)]
pub struct LinkLibraryMerge {
    /// `${VAR}` reference expected on the stray line.
    reference: String,
}

impl LinkLibraryMerge {
    pub fn new(var: &str) -> Self {
        Self {
            reference: format!("${{{var}}}"),
        }
    }

    fn stray_line(&self) -> String {
        format!("{})", self.reference)
    }
}

impl Rule for LinkLibraryMerge {
    fn name(&self) -> &'static str {
        "cmake-link-merge"
    }

    fn apply(&self, content: &str) -> RuleOutcome {
        let invocations = cmake::parse(content);
        let stray = self.stray_line();
        let mut edits = Vec::new();

        for inv in cmake::find(&invocations, COMMAND) {
            let Some(close) = inv.close else {
                continue;
            };
            // Nothing but whitespace may follow the call on its line.
            let call_line_end = content_end(content, close);
            if !content[close + 1..call_line_end].trim().is_empty() {
                continue;
            }
            let next_start = line_end(content, close);
            if next_start >= content.len() {
                continue;
            }
            let mut next_end = content_end(content, next_start);
            if content[next_start..next_end].trim() != stray {
                continue;
            }
            // Stacked stray lines all fold into the same call.
            loop {
                let after = line_end(content, next_end);
                if after >= content.len() {
                    break;
                }
                let after_end = content_end(content, after);
                if content[after..after_end].trim() != stray {
                    break;
                }
                next_end = after_end;
            }
            let already_listed = inv.arg_tokens(content).contains(&self.reference.as_str());
            let replacement = if already_listed {
                ")".to_string()
            } else {
                format!(" {})", self.reference)
            };
            edits.push(TextEdit::replace(close, next_end, replacement));
        }

        if edits.is_empty() {
            return RuleOutcome::NoAnchor;
        }
        RuleOutcome::Changed(apply_edits(content, edits))
    }
}
