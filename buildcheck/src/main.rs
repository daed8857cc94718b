//! `buildcheck`: probe the build environment and check the CMake project.

mod cmake;
mod probe;
mod report;
mod tools;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::cmake::{CmakeOptions, check_cmake};
use crate::probe::check_environment;
use crate::report::Report;
use crate::tools::ProcessToolRunner;

#[derive(Parser)]
#[command(
    name = "buildcheck",
    version,
    about = "Build environment and CMake configuration checks"
)]
struct Cli {
    /// Project root (contains the top-level CMakeLists.txt).
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Print the report as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check tools, compilers, environment variables and required files.
    Env,
    /// Check CMake script syntax and run a throwaway configure.
    Cmake {
        /// CMake generator, e.g. "Visual Studio 17 2022".
        #[arg(long, short = 'G')]
        generator: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("buildcheck=info")),
        )
        .init();

    match run(Cli::parse()) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("{:#}", err);
            std::process::exit(1);
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let runner = ProcessToolRunner;
    info!(root = %cli.root.display(), "starting checks");
    let report = match cli.command {
        Command::Env => Report::new(
            "env",
            check_environment(&cli.root, &runner, |var| std::env::var(var).ok())?,
        ),
        Command::Cmake { generator } => Report::new(
            "cmake",
            check_cmake(&cli.root, &runner, &CmakeOptions { generator })?,
        ),
    };

    if cli.json {
        let payload = serde_json::to_string_pretty(&report).context("serialize report")?;
        println!("{payload}");
    } else {
        print!("{}", report.render_text());
    }
    Ok(report.passed())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cmake_with_generator() {
        let cli = Cli::parse_from(["buildcheck", "cmake", "-G", "Visual Studio 17 2022"]);
        match cli.command {
            Command::Cmake { generator } => {
                assert_eq!(generator.as_deref(), Some("Visual Studio 17 2022"));
            }
            Command::Env => panic!("expected cmake"),
        }
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn parse_env_with_root_and_json() {
        let cli = Cli::parse_from(["buildcheck", "env", "--root", "sdk", "--json"]);
        assert!(matches!(cli.command, Command::Env));
        assert_eq!(cli.root, PathBuf::from("sdk"));
        assert!(cli.json);
    }
}
