//! Seam for invoking external build tools.

use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, instrument, warn};
use wait_timeout::ChildExt;

/// Bytes kept per stream; tool chatter past this is dropped.
const OUTPUT_LIMIT_BYTES: usize = 64 * 1024;

/// One tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolRequest {
    pub program: String,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    pub timeout: Duration,
}

impl ToolRequest {
    pub fn new(program: &str, timeout: Duration) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            cwd: None,
            timeout,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, dir: &Path) -> Self {
        self.cwd = Some(dir.to_path_buf());
        self
    }
}

/// What a tool run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolResult {
    Finished {
        success: bool,
        exit_code: Option<i32>,
        stdout: String,
        stderr: String,
    },
    TimedOut,
    /// The program could not be started (usually: not on PATH).
    NotFound,
}

impl ToolResult {
    pub fn succeeded(&self) -> bool {
        matches!(self, ToolResult::Finished { success: true, .. })
    }

    /// One-line description of a non-successful result.
    pub fn describe_failure(&self) -> String {
        match self {
            ToolResult::Finished {
                exit_code, stderr, ..
            } => {
                let code = exit_code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                match stderr.lines().find(|line| !line.trim().is_empty()) {
                    Some(line) => format!("exit {code}: {}", line.trim()),
                    None => format!("exit {code}"),
                }
            }
            ToolResult::TimedOut => "timed out".to_string(),
            ToolResult::NotFound => "not found".to_string(),
        }
    }
}

pub trait ToolRunner {
    fn run(&self, request: &ToolRequest) -> Result<ToolResult>;
}

/// Spawns the requested program with stdin closed, drains both pipes on reader
/// threads and kills it once the request's timeout passes.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessToolRunner;

impl ToolRunner for ProcessToolRunner {
    #[instrument(skip_all, fields(program = %request.program, timeout_secs = request.timeout.as_secs()))]
    fn run(&self, request: &ToolRequest) -> Result<ToolResult> {
        let mut cmd = Command::new(&request.program);
        cmd.args(&request.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &request.cwd {
            cmd.current_dir(dir);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("program not found");
                return Ok(ToolResult::NotFound);
            }
            Err(err) => {
                return Err(err).with_context(|| format!("spawn {}", request.program));
            }
        };

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("stdout was not piped"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("stderr was not piped"))?;
        let stdout = thread::spawn(move || read_limited(stdout, OUTPUT_LIMIT_BYTES));
        let stderr = thread::spawn(move || read_limited(stderr, OUTPUT_LIMIT_BYTES));

        let status = child
            .wait_timeout(request.timeout)
            .with_context(|| format!("wait for {}", request.program))?;
        let Some(status) = status else {
            warn!("tool timed out, killing");
            child.kill().with_context(|| format!("kill {}", request.program))?;
            child.wait().with_context(|| format!("reap {}", request.program))?;
            // Readers are detached; a grandchild may still hold the pipes open.
            drop((stdout, stderr));
            return Ok(ToolResult::TimedOut);
        };

        let stdout = join_reader(stdout).context("read stdout")?;
        let stderr = join_reader(stderr).context("read stderr")?;
        debug!(exit_code = ?status.code(), "tool finished");
        Ok(ToolResult::Finished {
            success: status.success(),
            exit_code: status.code(),
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
        })
    }
}

fn join_reader(handle: JoinHandle<Result<Vec<u8>>>) -> Result<Vec<u8>> {
    handle
        .join()
        .map_err(|_| anyhow!("output reader thread panicked"))?
}

/// Read `reader` to the end, keeping at most `limit` bytes.
fn read_limited<R: Read>(mut reader: R, limit: usize) -> Result<Vec<u8>> {
    let mut kept = Vec::new();
    let mut dropped = 0usize;
    let mut chunk = [0u8; 8192];
    loop {
        let n = reader.read(&mut chunk).context("read tool output")?;
        if n == 0 {
            break;
        }
        let keep = n.min(limit.saturating_sub(kept.len()));
        kept.extend_from_slice(&chunk[..keep]);
        dropped += n - keep;
    }
    if dropped > 0 {
        warn!(dropped, "tool output truncated");
    }
    Ok(kept)
}

#[cfg(test)]
pub mod fake {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use super::*;

    /// Scripted results keyed by program and first argument.
    #[derive(Default)]
    pub struct FakeTools {
        results: HashMap<(String, String), ToolResult>,
        pub calls: RefCell<Vec<ToolRequest>>,
        /// Files to create in the request's working directory when it runs.
        pub on_run_write: Vec<(String, String)>,
    }

    impl FakeTools {
        pub fn with(mut self, program: &str, first_arg: &str, result: ToolResult) -> Self {
            self.results
                .insert((program.to_string(), first_arg.to_string()), result);
            self
        }

        pub fn ok(stdout: &str) -> ToolResult {
            ToolResult::Finished {
                success: true,
                exit_code: Some(0),
                stdout: stdout.to_string(),
                stderr: String::new(),
            }
        }

        pub fn err(stderr: &str) -> ToolResult {
            ToolResult::Finished {
                success: false,
                exit_code: Some(1),
                stdout: String::new(),
                stderr: stderr.to_string(),
            }
        }
    }

    impl ToolRunner for FakeTools {
        fn run(&self, request: &ToolRequest) -> Result<ToolResult> {
            self.calls.borrow_mut().push(request.clone());
            let first = request
                .args
                .first()
                .map(|arg| arg.to_string_lossy().into_owned())
                .unwrap_or_default();
            let result = self
                .results
                .get(&(request.program.clone(), first))
                .cloned()
                .unwrap_or(ToolResult::NotFound);
            if result.succeeded()
                && let Some(dir) = &request.cwd
            {
                for (name, contents) in &self.on_run_write {
                    std::fs::write(dir.join(name), contents)?;
                }
            }
            Ok(result)
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_not_found() {
        let result = ProcessToolRunner
            .run(&ToolRequest::new(
                "definitely-not-a-real-tool-xyz",
                Duration::from_secs(1),
            ))
            .expect("run");
        assert_eq!(result, ToolResult::NotFound);
    }

    #[test]
    fn captures_exit_and_stderr() {
        let result = ProcessToolRunner
            .run(
                &ToolRequest::new("sh", Duration::from_secs(5))
                    .arg("-c")
                    .arg("echo boom >&2; exit 4"),
            )
            .expect("run");
        assert!(!result.succeeded());
        assert_eq!(result.describe_failure(), "exit 4: boom");
    }

    #[test]
    fn slow_tool_times_out() {
        let result = ProcessToolRunner
            .run(
                &ToolRequest::new("sh", Duration::from_millis(200))
                    .arg("-c")
                    .arg("sleep 5"),
            )
            .expect("run");
        assert_eq!(result, ToolResult::TimedOut);
    }

    #[test]
    fn captures_stdout_of_successful_tool() {
        let result = ProcessToolRunner
            .run(
                &ToolRequest::new("sh", Duration::from_secs(5))
                    .arg("-c")
                    .arg("pwd")
                    .cwd(Path::new("/")),
            )
            .expect("run");
        assert!(result.succeeded());
        let ToolResult::Finished { stdout, .. } = result else {
            panic!("expected finished");
        };
        assert_eq!(stdout, "/\n");
    }

    #[test]
    fn output_is_capped() {
        let big = vec![b'x'; OUTPUT_LIMIT_BYTES + 100];
        let out = read_limited(big.as_slice(), OUTPUT_LIMIT_BYTES).expect("read");
        assert_eq!(out.len(), OUTPUT_LIMIT_BYTES);
    }
}
