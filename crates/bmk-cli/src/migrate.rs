//! # Migrate Subcommand
//!
//! Upgrades a record file, or a whole directory tree, to a target version.
//! A directory is handed to [`BatchMigrator`], which mirrors the tree under
//! `OUTPUT` and keeps going past records that fail.
//!
//! Exit code 0 when every record migrated, 1 if any failed.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bmk_core::Version;
use bmk_migrate::{BatchEvent, BatchMigrator, MigrationReport, Migrator, PathPolicy};
use clap::Args;

use crate::CliContext;

/// Arguments for the `bmk migrate` subcommand.
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Record file or directory of records.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output file (for a file input) or directory (for a directory input).
    /// Resolved like `INPUT`: an existing path under the project root wins,
    /// otherwise it is relative to the current directory.
    #[arg(value_name = "OUTPUT")]
    pub output: PathBuf,

    /// Target version. Defaults to the configured target.
    #[arg(long = "to", value_name = "X.Y.Z")]
    pub to: Option<Version>,

    /// Path policy: `direct` or `shortest`.
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<PathPolicy>,
}

/// Execute the migrate subcommand.
pub fn run_migrate(args: &MigrateArgs, ctx: &CliContext) -> Result<u8> {
    let input = crate::resolve_path(&args.input, &ctx.project_root);
    let output = crate::resolve_path(&args.output, &ctx.project_root);
    let target = args.to.unwrap_or(ctx.config.target_version);
    let migrator = Migrator::new(ctx.registry(args.policy));

    if input.is_dir() {
        let report = migrate_tree(migrator, &input, &output, &target)?;
        print_report(&report);
        Ok(if report.is_success() { 0 } else { 1 })
    } else if input.is_file() {
        let source = migrator
            .migrate_file(&input, &output, &target)
            .with_context(|| format!("failed to migrate {}", input.display()))?;
        println!(
            "OK: {} -> {} ({source} -> {target})",
            input.display(),
            output.display()
        );
        Ok(0)
    } else {
        bail!("path does not exist: {}", input.display());
    }
}

/// Batch-migrate `input` into `output`, logging progress.
pub fn migrate_tree(
    migrator: Migrator,
    input: &Path,
    output: &Path,
    target: &Version,
) -> Result<MigrationReport> {
    BatchMigrator::new(migrator)
        .with_observer(log_event)
        .migrate_directory(input, output, target)
        .with_context(|| format!("failed to migrate {}", input.display()))
}

/// Turn batch progress into log lines.
pub(crate) fn log_event(event: &BatchEvent) {
    match event {
        BatchEvent::Started { root, total } => {
            tracing::info!(root = %root.display(), total, "batch started");
        }
        BatchEvent::ItemSucceeded {
            path,
            source_version,
        } => {
            tracing::info!(path = %path.display(), from = %source_version, "ok");
        }
        BatchEvent::ItemFailed { path, .. } => {
            tracing::debug!(path = %path.display(), "failed");
        }
        BatchEvent::Finished { processed, failed } => {
            tracing::debug!(processed, failed, "batch done");
        }
    }
}

fn print_report(report: &MigrationReport) {
    println!("{report}");
    for error in &report.errors {
        println!("  FAIL: {error}");
    }
    if report.is_mixed() {
        let versions: Vec<String> = report
            .source_versions
            .iter()
            .map(|(v, n)| format!("{v} ({n})"))
            .collect();
        println!("  source versions: {}", versions.join(", "));
    }
}
