//! # bmk CLI entry point
//!
//! Parses command-line arguments, installs logging, loads configuration
//! and dispatches to the subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bmk_cli::config::CliConfig;
use bmk_cli::migrate::{run_migrate, MigrateArgs};
use bmk_cli::migrations::{run_migrations, MigrationsArgs};
use bmk_cli::report::{run_report, ReportArgs};
use bmk_cli::validate::{run_validate, ValidateArgs};
use bmk_cli::{resolve_project_root, CliContext};

/// Benchmark record schema validation and migration.
#[derive(Parser, Debug)]
#[command(name = "bmk", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to configuration file. Defaults to `bmk.yaml` at the project root.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate records against their schema generation.
    Validate(ValidateArgs),

    /// Migrate a record or a directory of records to a target version.
    Migrate(MigrateArgs),

    /// Dry-run a migration and print the report as JSON.
    Report(ReportArgs),

    /// List registered migrations.
    Migrations(MigrationsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    if cli.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let project_root = resolve_project_root(&cwd).unwrap_or_else(|| {
        tracing::warn!("Could not locate project root; using current directory");
        cwd.clone()
    });
    tracing::debug!(project_root = %project_root.display(), "resolved project root");

    let config = match CliConfig::discover(cli.config.as_deref(), &project_root) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e:#}");
            return ExitCode::from(1);
        }
    };
    let ctx = CliContext::new(project_root, config);

    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, &ctx),
        Commands::Migrate(args) => run_migrate(&args, &ctx),
        Commands::Report(args) => run_report(&args, &ctx),
        Commands::Migrations(args) => run_migrations(&args, &ctx),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
