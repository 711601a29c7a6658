//! # Report Subcommand
//!
//! Dry run over a directory of records: for each one, can it be migrated to
//! the target? Nothing is written. The [`MigrationReport`] is printed to
//! stdout as JSON so pipelines can consume it.
//!
//! Exit code 0 when every record has a path, 1 otherwise.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use bmk_core::Version;
use bmk_migrate::{BatchMigrator, MigrationReport, Migrator, PathPolicy};
use clap::Args;

use crate::CliContext;

/// Arguments for the `bmk report` subcommand.
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Directory of records.
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Target version. Defaults to the configured target.
    #[arg(long = "to", value_name = "X.Y.Z")]
    pub to: Option<Version>,

    /// Path policy: `direct` or `shortest`.
    #[arg(long, value_name = "POLICY")]
    pub policy: Option<PathPolicy>,
}

/// Execute the report subcommand.
pub fn run_report(args: &ReportArgs, ctx: &CliContext) -> Result<u8> {
    let report = build_report(args, ctx)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(if report.is_success() { 0 } else { 1 })
}

/// Produce the dry-run report without printing it.
pub fn build_report(args: &ReportArgs, ctx: &CliContext) -> Result<MigrationReport> {
    let input = crate::resolve_path(&args.input, &ctx.project_root);
    if !input.is_dir() {
        bail!("not a directory: {}", input.display());
    }
    let target = args.to.unwrap_or(ctx.config.target_version);

    BatchMigrator::new(Migrator::new(ctx.registry(args.policy)))
        .with_observer(crate::migrate::log_event)
        .generate_report(&input, &target)
        .with_context(|| format!("failed to inspect {}", input.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;

    #[test]
    fn test_report_counts_and_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("in");
        std::fs::create_dir_all(&input).unwrap();
        std::fs::write(input.join("a.json"), r#"{"metric": 1}"#).unwrap();
        std::fs::write(input.join("b.json"), r#"{"schema_version": "1.1.0"}"#).unwrap();
        std::fs::write(input.join("c.json"), r#"{"schema_version": "x"}"#).unwrap();

        let ctx = CliContext::new(root.path(), CliConfig::default());
        let args = ReportArgs {
            input: input.clone(),
            to: None,
            policy: None,
        };
        let report = build_report(&args, &ctx).unwrap();
        assert_eq!(report.files_processed, 3);
        assert_eq!(report.files_succeeded, 2);
        assert_eq!(report.files_failed, 1);
        assert!(report.errors[0].starts_with("c.json: invalid schema_version"));
        assert_eq!(std::fs::read_dir(&input).unwrap().count(), 3);

        assert_eq!(run_report(&args, &ctx).unwrap(), 1);
    }

    #[test]
    fn test_report_requires_directory() {
        let root = tempfile::tempdir().unwrap();
        let file = root.path().join("a.json");
        std::fs::write(&file, "{}").unwrap();
        let ctx = CliContext::new(root.path(), CliConfig::default());
        let args = ReportArgs {
            input: file,
            to: None,
            policy: None,
        };
        assert!(build_report(&args, &ctx).is_err());
    }
}
