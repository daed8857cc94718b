//! Cross-platform support injection for example `CMakeLists.txt` files.
//!
//! Three edits, all computed against the unmodified file:
//!
//! 1. a platform-detection block after the `project(...)` line,
//! 2. the hard-coded homebrew include line replaced by per-platform includes,
//! 3. a platform-library assignment before the first `target_link_libraries`
//!    call, and the library variable appended inside every such call.
//!
//! A file without a well-formed `project(...)` call is left alone.

use crate::core::cmake;
use crate::core::edit::{TextEdit, apply_edits, content_end, detect_newline, line_end, line_start};
use crate::core::rule::{Rule, RuleOutcome};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformSettings {
    /// Variable set by the detection block; its presence marks the file as done.
    pub marker: String,
    /// Exact include line to replace.
    pub homebrew_include: String,
    /// Variable holding extra libraries to link.
    pub libs_var: String,
    /// Libraries linked on Windows.
    pub windows_libs: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PlatformSupport {
    settings: PlatformSettings,
}

impl PlatformSupport {
    pub fn new(settings: PlatformSettings) -> Self {
        Self { settings }
    }

    fn detection_block(&self) -> Vec<String> {
        let m = &self.settings.marker;
        vec![
            "# Platform detection".to_string(),
            "if(CMAKE_SYSTEM_NAME STREQUAL \"Windows\")".to_string(),
            format!("    set({m} \"windows\")"),
            "elseif(CMAKE_SYSTEM_NAME STREQUAL \"Darwin\")".to_string(),
            format!("    set({m} \"macos\")"),
            "else()".to_string(),
            format!("    set({m} \"linux\")"),
            "endif()".to_string(),
        ]
    }

    fn include_block(&self) -> Vec<String> {
        let m = &self.settings.marker;
        vec![
            "# Platform-specific include directories".to_string(),
            format!("if({m} STREQUAL \"macos\")"),
            format!("    {}", self.settings.homebrew_include),
            format!("elseif({m} STREQUAL \"windows\")"),
            "    if(DEFINED ENV{OPENSSL_ROOT_DIR})".to_string(),
            "        include_directories(\"$ENV{OPENSSL_ROOT_DIR}/include\")".to_string(),
            "    endif()".to_string(),
            "    if(DEFINED ENV{WINDOWS_SDK_PATH})".to_string(),
            "        include_directories(\"$ENV{WINDOWS_SDK_PATH}/Include\")".to_string(),
            "    endif()".to_string(),
            "endif()".to_string(),
        ]
    }

    fn libs_block(&self) -> Vec<String> {
        let m = &self.settings.marker;
        let v = &self.settings.libs_var;
        vec![
            "# Platform-specific libraries".to_string(),
            format!("if({m} STREQUAL \"windows\")"),
            format!("    set({v} {})", self.settings.windows_libs.join(" ")),
            "else()".to_string(),
            format!("    set({v} \"\")"),
            "endif()".to_string(),
        ]
    }
}

/// Join block lines with `newline`, prefixing every line but the first with
/// `indent`.
fn render(lines: &[String], indent: &str, newline: &str) -> String {
    let mut out = String::new();
    for (idx, line) in lines.iter().enumerate() {
        if idx > 0 {
            out.push_str(newline);
            out.push_str(indent);
        }
        out.push_str(line);
    }
    out
}

impl Rule for PlatformSupport {
    fn name(&self) -> &'static str {
        "platform-support"
    }

    fn apply(&self, content: &str) -> RuleOutcome {
        if content.contains(&self.settings.marker) {
            return RuleOutcome::AlreadyApplied;
        }
        let invocations = cmake::parse(content);
        let Some(project_close) = cmake::find(&invocations, "project").find_map(|inv| inv.close)
        else {
            return RuleOutcome::NoAnchor;
        };
        let nl = detect_newline(content);
        let mut edits = Vec::new();

        // 1. detection block on the line after `project(...)`
        let after_project = line_end(content, project_close);
        let lead = if after_project == content.len() && !content.ends_with('\n') {
            nl
        } else {
            ""
        };
        edits.push(TextEdit::insert(
            after_project,
            format!("{lead}{nl}{}{nl}", render(&self.detection_block(), "", nl)),
        ));

        // 2. per-platform include block in place of the hard-coded include
        let include = self.settings.homebrew_include.as_str();
        let mut offset = 0;
        while offset < content.len() {
            let end = content_end(content, offset);
            let line = &content[offset..end];
            if !include.is_empty() && line.trim() == include {
                let indent_len = line.len() - line.trim_start().len();
                let indent = &line[..indent_len];
                edits.push(TextEdit::replace(
                    offset + indent_len,
                    end,
                    render(&self.include_block(), indent, nl),
                ));
            }
            offset = line_end(content, offset);
        }

        // 3. library variable before the first link call and inside every call
        let reference = format!("${{{}}}", self.settings.libs_var);
        let mut first_link = true;
        for inv in cmake::find(&invocations, "target_link_libraries") {
            let (Some(close), Some(args)) = (inv.close, inv.args(content)) else {
                continue;
            };
            if first_link {
                let at = line_start(content, inv.start);
                let indent = &content[at..inv.start];
                edits.push(TextEdit::insert(
                    at,
                    format!("{indent}{}{nl}{nl}", render(&self.libs_block(), indent, nl)),
                ));
                first_link = false;
            }
            if inv.arg_tokens(content).contains(&reference.as_str()) {
                continue;
            }
            let insert_at = inv.args_start() + args.trim_end().len();
            edits.push(TextEdit::insert(insert_at.min(close), format!(" {reference}")));
        }

        RuleOutcome::Changed(apply_edits(content, edits))
    }
}
