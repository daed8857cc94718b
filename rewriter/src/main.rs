//! `rewriter`: apply idempotent, backup-safe rewrites to source trees.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::warn;

use rewriter::exit_codes;
use rewriter::io::backups::clean_backups;
use rewriter::io::config::{DEFAULT_CONFIG_FILE, RewriterConfig, load_config, write_config};
use rewriter::io::fs::StdFileSystem;
use rewriter::logging;
use rewriter::rewrite::{PassOptions, run_pass};
use rewriter::ruleset::{RuleSetKind, build};
use rewriter::summary::render_text;

#[derive(Parser)]
#[command(
    name = "rewriter",
    version,
    about = "Idempotent, backup-safe rewriting of source trees"
)]
struct Cli {
    /// Config file (TOML). Defaults apply when it does not exist.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Report what would change without writing anything.
    #[arg(long, global = true)]
    dry_run: bool,

    /// Print the summary as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Default)]
struct Roots {
    /// Directories to process. Prompts on stdin when omitted.
    #[arg(value_name = "ROOT")]
    roots: Vec<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Prepend the license header to C/C++ sources that lack it.
    License(Roots),
    /// Replace the values of sensitive `#define` macros with the sentinel.
    Redact(Roots),
    /// Raise `cmake_minimum_required` to the configured version.
    CmakeVersion(Roots),
    /// Merge stray `${VAR})` lines into the preceding `target_link_libraries` call.
    CmakeLinks(Roots),
    /// Inject platform detection, includes and libraries into CMakeLists.txt.
    Platform(Roots),
    /// Version bump followed by link merge.
    Cmake(Roots),
    /// Delete backup files left by earlier passes.
    CleanBackups(Roots),
    /// Write the default config file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(exit_codes::INVALID);
        }
    }
}

fn run(cli: Cli) -> Result<i32> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let (kind, roots) = match cli.command {
        Command::InitConfig { force } => return cmd_init_config(&config_path, force),
        Command::License(roots) => (Some(RuleSetKind::License), roots),
        Command::Redact(roots) => (Some(RuleSetKind::Redact), roots),
        Command::CmakeVersion(roots) => (Some(RuleSetKind::CmakeVersion), roots),
        Command::CmakeLinks(roots) => (Some(RuleSetKind::CmakeLinks), roots),
        Command::Platform(roots) => (Some(RuleSetKind::Platform), roots),
        Command::Cmake(roots) => (Some(RuleSetKind::Cmake), roots),
        Command::CleanBackups(roots) => (None, roots),
    };

    let cfg = load_config(&config_path)?;
    let roots = resolve_roots(roots)?;
    match kind {
        Some(kind) => cmd_pass(kind, &cfg, &roots, cli.dry_run, cli.json),
        None => cmd_clean_backups(&cfg, &roots, cli.dry_run, cli.json),
    }
}

fn resolve_roots(roots: Roots) -> Result<Vec<PathBuf>> {
    if !roots.roots.is_empty() {
        return Ok(roots.roots);
    }
    let stdin = io::stdin();
    let root = prompt_root(&mut stdin.lock(), &mut io::stdout())?;
    Ok(vec![root])
}

/// Ask for a single directory on `input`.
fn prompt_root<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<PathBuf> {
    write!(output, "Enter the directory to process: ").context("write prompt")?;
    output.flush().context("flush prompt")?;
    let mut line = String::new();
    input.read_line(&mut line).context("read directory from stdin")?;
    let root = line.trim();
    if root.is_empty() {
        bail!("no directory given");
    }
    Ok(PathBuf::from(root))
}

fn cmd_pass(
    kind: RuleSetKind,
    cfg: &RewriterConfig,
    roots: &[PathBuf],
    dry_run: bool,
    json: bool,
) -> Result<i32> {
    let set = build(kind, cfg)?;
    let options = PassOptions::from_config(cfg, dry_run);
    let summary = run_pass(roots, &set, &StdFileSystem, &options);

    if json {
        let payload = serde_json::to_string_pretty(&summary).context("serialize summary")?;
        println!("{payload}");
    } else {
        print!("{}", render_text(&summary));
    }

    if summary.has_failures() {
        Ok(exit_codes::FILE_FAILURES)
    } else {
        Ok(exit_codes::OK)
    }
}

fn cmd_clean_backups(
    cfg: &RewriterConfig,
    roots: &[PathBuf],
    dry_run: bool,
    json: bool,
) -> Result<i32> {
    let mut removed = Vec::new();
    for root in roots {
        if !root.exists() {
            warn!(root = %root.display(), "root does not exist, skipping");
            continue;
        }
        removed.extend(clean_backups(root, &cfg.backup_suffix, dry_run)?);
    }

    if json {
        let payload = json!({ "dry_run": dry_run, "backups": removed });
        println!("{}", serde_json::to_string_pretty(&payload).context("serialize backups")?);
    } else {
        let verb = if dry_run { "would remove" } else { "removed" };
        for path in &removed {
            println!("{verb}: {}", path.display());
        }
        println!("clean-backups: {} {verb}", removed.len());
    }
    Ok(exit_codes::OK)
}

fn cmd_init_config(path: &Path, force: bool) -> Result<i32> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    write_config(path, &RewriterConfig::default())?;
    println!("wrote {}", path.display());
    Ok(exit_codes::OK)
}
