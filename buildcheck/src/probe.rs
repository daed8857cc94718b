//! Build-environment probe: tools, compilers, environment variables and the
//! files a Windows build needs.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, instrument};

use crate::report::Check;
use crate::tools::{ToolRequest, ToolResult, ToolRunner};

const VERSION_TIMEOUT: Duration = Duration::from_secs(10);

const REQUIRED_TOOLS: [(&str, &str); 2] = [("cmake", "CMake"), ("git", "Git")];

const COMPILERS: [(&str, &str); 2] = [("cl", "Visual Studio MSVC"), ("gcc", "MinGW-w64 GCC")];

const OPTIONAL_ENV: [(&str, &str); 2] = [
    ("OPENSSL_ROOT_DIR", "OpenSSL root directory"),
    ("WINDOWS_SDK_PATH", "Windows SDK path"),
];

const REQUIRED_FILES: [&str; 4] = [
    "CMakeLists.txt",
    "build.bat",
    "build.ps1",
    "docs/develop_windows.md",
];

/// `<tool> --version`; the first line of stdout on success.
fn tool_version<R: ToolRunner + ?Sized>(runner: &R, tool: &str) -> Result<Result<String, String>> {
    let result = runner.run(&ToolRequest::new(tool, VERSION_TIMEOUT).arg("--version"))?;
    debug!(tool, ?result, "version probe");
    Ok(match result {
        ToolResult::Finished {
            success: true,
            stdout,
            ..
        } => Ok(stdout.lines().next().unwrap_or("").trim().to_string()),
        other => Err(other.describe_failure()),
    })
}

/// Run every environment check against `root`.
///
/// `env` looks up environment variables so tests do not depend on the
/// process environment.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn check_environment<R, E>(root: &Path, runner: &R, env: E) -> Result<Vec<Check>>
where
    R: ToolRunner + ?Sized,
    E: Fn(&str) -> Option<String>,
{
    let mut checks = vec![Check::pass(
        "platform",
        format!("{} {}", std::env::consts::OS, std::env::consts::ARCH),
    )];

    for (tool, label) in REQUIRED_TOOLS {
        checks.push(match tool_version(runner, tool)? {
            Ok(version) => Check::pass(label, version),
            Err(reason) => Check::fail(label, reason),
        });
    }

    let mut compiler_found = false;
    for (tool, label) in COMPILERS {
        checks.push(match tool_version(runner, tool)? {
            Ok(version) => {
                compiler_found = true;
                Check::pass(label, version)
            }
            Err(reason) => Check::warn(label, reason),
        });
    }
    if !compiler_found {
        checks.push(Check::fail("C/C++ compiler", "no compiler found"));
    }

    for (var, label) in OPTIONAL_ENV {
        checks.push(match env(var).filter(|value| !value.is_empty()) {
            Some(value) => Check::pass(label, value),
            None => Check::warn(label, format!("{var} not set (optional)")),
        });
    }

    for file in REQUIRED_FILES {
        checks.push(if root.join(file).exists() {
            Check::pass(file, "present")
        } else {
            Check::fail(file, "missing")
        });
    }

    Ok(checks)
}
