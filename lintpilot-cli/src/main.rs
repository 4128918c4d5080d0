//! LintPilot CLI - Command line interface for LintPilot
//!
//! Runs the per-language static analyzers over local files and prints the
//! normalized issues.

mod commands;

use std::time::Duration;

use clap::{Parser, Subcommand};
use lintpilot_core::{CliOverrides, Config};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::AnalyzeArgs;

/// LintPilot: static analysis orchestration for pull requests
#[derive(Parser, Debug)]
#[command(name = "lintpilot")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Deadline for each analyzer, e.g. `90s` or `2m` (overrides config and env)
    #[arg(long, global = true, value_parser = parse_duration)]
    timeout: Option<Duration>,

    /// Run analyzers concurrently
    #[arg(long, global = true)]
    concurrent: bool,

    /// Never install analyzer plugins before running
    #[arg(long, global = true)]
    skip_install: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Analyze files with the matching static analyzers
    #[command(visible_alias = "a")]
    Analyze(AnalyzeArgs),

    /// Show current configuration
    Config,
}

fn parse_duration(value: &str) -> Result<Duration, String> {
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays clean
    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let overrides = CliOverrides {
        timeout: cli.timeout,
        concurrent: cli.concurrent,
        skip_install: cli.skip_install,
    };
    let config = Config::load_with_overrides(&overrides)?;

    if cli.verbose {
        tracing::info!(
            timeout = ?config.analysis.timeout,
            concurrent = config.analysis.concurrent,
            install_dependencies = config.analysis.install_dependencies,
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("lintpilot {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Analyze(args)) => {
            args.execute(config).await?;
        }
        Some(Commands::Config) => {
            println!("LintPilot Configuration");
            println!("=======================");
            println!();
            print!("{}", toml::to_string_pretty(&config)?);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("LintPilot - static analysis orchestration for pull requests");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
