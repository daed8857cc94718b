//! CMake script syntax checks and a throwaway configure run.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use rewriter::core::filter::FileFilter;
use rewriter::io::walker::candidates;
use tracing::{info, instrument, warn};

use crate::report::Check;
use crate::tools::{ToolRequest, ToolRunner};

const ROOT_SCRIPT_TIMEOUT: Duration = Duration::from_secs(30);
const EXAMPLE_SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);
const CONFIGURE_TIMEOUT: Duration = Duration::from_secs(120);

const CACHE_PLATFORM_KEY: &str = "BUILD_PLATFORM:STRING=";

#[derive(Debug, Clone, Default)]
pub struct CmakeOptions {
    /// Passed as `-G`; cmake picks its default generator when unset.
    pub generator: Option<String>,
}

/// `cmake -P` on the root script and every example `CMakeLists.txt`, then a
/// configure in a temp build directory.
#[instrument(skip_all, fields(root = %root.display()))]
pub fn check_cmake<R: ToolRunner + ?Sized>(
    root: &Path,
    runner: &R,
    options: &CmakeOptions,
) -> Result<Vec<Check>> {
    let root_script = root.join("CMakeLists.txt");
    if !root_script.exists() {
        return Ok(vec![Check::fail(
            "CMakeLists.txt",
            "not found; run from the project root",
        )]);
    }

    let mut checks = vec![syntax_check(
        runner,
        root,
        &root_script,
        ROOT_SCRIPT_TIMEOUT,
    )?];
    for script in example_scripts(root) {
        checks.push(syntax_check(runner, root, &script, EXAMPLE_SCRIPT_TIMEOUT)?);
    }
    checks.extend(configure(root, runner, options)?);
    Ok(checks)
}

fn example_scripts(root: &Path) -> Vec<PathBuf> {
    let examples = root.join("examples");
    if !examples.is_dir() {
        return Vec::new();
    }
    let filter = FileFilter::FileName("CMakeLists.txt".to_string());
    candidates(&examples, &filter, &[]).collect()
}

fn syntax_check<R: ToolRunner + ?Sized>(
    runner: &R,
    root: &Path,
    script: &Path,
    timeout: Duration,
) -> Result<Check> {
    let name = script
        .strip_prefix(root)
        .unwrap_or(script)
        .display()
        .to_string();
    let result = runner.run(
        &ToolRequest::new("cmake", timeout)
            .arg("-P")
            .arg(script.as_os_str())
            .cwd(root),
    )?;
    Ok(if result.succeeded() {
        Check::pass(format!("syntax {name}"), "valid")
    } else {
        Check::fail(format!("syntax {name}"), result.describe_failure())
    })
}

fn configure<R: ToolRunner + ?Sized>(
    root: &Path,
    runner: &R,
    options: &CmakeOptions,
) -> Result<Vec<Check>> {
    let build_dir = tempfile::Builder::new()
        .prefix("buildcheck_")
        .tempdir()
        .context("create temp build directory")?;

    let mut request = ToolRequest::new("cmake", CONFIGURE_TIMEOUT).cwd(build_dir.path());
    if let Some(generator) = &options.generator {
        request = request.arg("-G").arg(generator);
    }
    request = request
        .arg("-DONESDK_WITH_EXAMPLE=OFF")
        .arg("-DONESDK_WITH_TEST=OFF")
        .arg(root.as_os_str());

    info!(build_dir = %build_dir.path().display(), "configuring");
    let result = runner.run(&request)?;
    if !result.succeeded() {
        return Ok(vec![Check::fail("configure", result.describe_failure())]);
    }

    let mut checks = vec![Check::pass("configure", "succeeded")];
    let cache_path = build_dir.path().join("CMakeCache.txt");
    checks.push(match fs::read_to_string(&cache_path) {
        Ok(cache) => match cache_platform(&cache) {
            Some(platform) => Check::pass("platform detection", platform),
            None => Check::warn(
                "platform detection",
                format!("{CACHE_PLATFORM_KEY} missing from CMakeCache.txt"),
            ),
        },
        Err(err) => {
            warn!(err = %err, "CMakeCache.txt not readable");
            Check::warn("platform detection", "CMakeCache.txt not generated")
        }
    });
    Ok(checks)
}

/// Value of the cached platform variable, if the configure step recorded one.
fn cache_platform(cache: &str) -> Option<String> {
    cache
        .lines()
        .find_map(|line| line.strip_prefix(CACHE_PLATFORM_KEY))
        .map(|value| value.trim().to_string())
}
