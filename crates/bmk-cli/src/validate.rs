//! # Validate Subcommand
//!
//! Checks one record, or every `*.json` record beneath a directory, against
//! its schema generation. Without `--schema-version` each record picks its
//! own generation by auto-detection; with it, every record is checked
//! against that one generation.
//!
//! Exit code 0 when every record is valid, 1 otherwise. Version mismatch
//! warnings are printed but never change the exit code.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use bmk_core::Version;
use bmk_schema::{SchemaError, SchemaManager, ValidationResult};
use clap::Args;
use serde::Serialize;

use crate::{CliContext, JsonEntry};

/// Arguments for the `bmk validate` subcommand.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Record file or directory of records.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Validate against this generation instead of auto-detecting.
    #[arg(long, value_name = "X.Y.Z")]
    pub schema_version: Option<Version>,

    /// Print results as JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

/// Validation result for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileValidation {
    /// Path relative to the validated directory.
    pub path: String,
    #[serde(flatten)]
    pub result: ValidationResult,
}

/// Execute the validate subcommand.
pub fn run_validate(args: &ValidateArgs, ctx: &CliContext) -> Result<u8> {
    let target = crate::resolve_path(&args.path, &ctx.project_root);
    let outcomes = validate_path(&target, args.schema_version.as_ref(), ctx)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print_text(&outcomes);
    }

    let all_valid = outcomes.iter().all(|o| o.result.valid);
    Ok(if all_valid { 0 } else { 1 })
}

/// Validate `target` (file or directory) and return one entry per record.
pub fn validate_path(
    target: &Path,
    schema_version: Option<&Version>,
    ctx: &CliContext,
) -> Result<Vec<FileValidation>> {
    let manager = SchemaManager::new(ctx.schema_dir());
    let entries = if target.is_dir() {
        crate::collect_json_files(target)
    } else if target.is_file() {
        vec![JsonEntry::File(target.to_path_buf())]
    } else {
        bail!("path does not exist: {}", target.display());
    };

    let fixed = match schema_version {
        Some(v) => Some(
            manager
                .get_validator(v)
                .with_context(|| format!("failed to load schema generation {v}"))?,
        ),
        None => None,
    };
    let unreadable_version = schema_version.copied().unwrap_or(Version::DEFAULT);

    let mut outcomes = Vec::with_capacity(entries.len());
    for entry in entries {
        let (file, result) = match entry {
            JsonEntry::File(file) => {
                let validated = match &fixed {
                    Some(validator) => validator.validate_file(&file),
                    None => manager.validate_file_with_auto_detection(&file),
                };
                let result = match validated {
                    Ok(result) => result,
                    Err(SchemaError::DocumentLoad { reason, .. }) => {
                        unreadable(unreadable_version, &reason)
                    }
                    Err(e) => {
                        return Err(e)
                            .with_context(|| format!("failed to validate {}", file.display()))
                    }
                };
                (file, result)
            }
            JsonEntry::Unreadable { path, reason } => {
                let result = unreadable(unreadable_version, &reason);
                (path, result)
            }
        };

        tracing::debug!(path = %file.display(), %result, "validated");
        outcomes.push(FileValidation {
            path: crate::display_relative(&file, target),
            result,
        });
    }

    tracing::info!(
        files = outcomes.len(),
        cached = ?manager.cached_versions(),
        "validation finished"
    );
    Ok(outcomes)
}

/// Invalid result for a record that could not be read.
fn unreadable(schema_version: Version, reason: &str) -> ValidationResult {
    ValidationResult {
        valid: false,
        errors: vec![format!("unreadable: {reason}")],
        warnings: Vec::new(),
        schema_version,
        data_version: Version::DEFAULT,
    }
}

fn print_text(outcomes: &[FileValidation]) {
    for outcome in outcomes {
        let r = &outcome.result;
        let status = if r.valid { "OK" } else { "FAIL" };
        println!(
            "{status}: {} (schema {}, data {})",
            outcome.path, r.schema_version, r.data_version
        );
        for e in &r.errors {
            println!("  error: {e}");
        }
        for w in &r.warnings {
            println!("  warning: {w}");
        }
    }

    let passed = outcomes.iter().filter(|o| o.result.valid).count();
    println!("Records: {}/{} valid", passed, outcomes.len());
}
