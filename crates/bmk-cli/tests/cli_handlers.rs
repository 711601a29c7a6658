//! Integration test: CLI handlers against the schema generations shipped in
//! `schemas/`, covering the validate → migrate → validate round.

use std::path::{Path, PathBuf};

use bmk_cli::config::CliConfig;
use bmk_cli::migrate::{run_migrate, MigrateArgs};
use bmk_cli::report::{build_report, ReportArgs};
use bmk_cli::validate::validate_path;
use bmk_cli::CliContext;
use bmk_core::Version;
use serde_json::json;

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn ctx() -> CliContext {
    CliContext::new(repo_root(), CliConfig::default())
}

fn write(dir: &Path, name: &str, value: serde_json::Value) {
    std::fs::write(dir.join(name), serde_json::to_vec_pretty(&value).unwrap()).unwrap();
}

fn legacy_corpus(dir: &Path) {
    write(
        dir,
        "coremark.json",
        json!({
            "benchmark": "coremark",
            "metric": 41.9,
            "unit": "iterations/s",
            "metadata": {"data_version": "1.0", "instance_type": "m7g.large"}
        }),
    );
    write(
        dir,
        "stream.json",
        json!({
            "schema_version": "1.0.0",
            "benchmark": "stream",
            "results": [{"name": "triad", "value": 18.2, "unit": "GB/s"}],
            "metadata": {"data_version": "1.0"}
        }),
    );
}

#[test]
fn test_migrated_corpus_validates_against_v1_1() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    legacy_corpus(input.path());

    let before = validate_path(input.path(), None, &ctx()).unwrap();
    assert!(before.iter().all(|o| o.result.valid), "{before:?}");
    assert!(before
        .iter()
        .all(|o| o.result.schema_version == Version::new(1, 0, 0)));

    let args = MigrateArgs {
        input: input.path().to_path_buf(),
        output: output.path().to_path_buf(),
        to: Some(Version::new(1, 1, 0)),
        policy: None,
    };
    assert_eq!(run_migrate(&args, &ctx()).unwrap(), 0);

    let after = validate_path(output.path(), None, &ctx()).unwrap();
    assert_eq!(after.len(), 2);
    for outcome in &after {
        assert!(outcome.result.valid, "{}: {:?}", outcome.path, outcome.result.errors);
        assert_eq!(outcome.result.schema_version, Version::new(1, 1, 0));
        assert_eq!(outcome.result.data_version, Version::new(1, 1, 0));
        assert!(outcome.result.warnings.is_empty());
    }
}

#[test]
fn test_forced_generation_reports_type_errors() {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "bad.json",
        json!({"schema_version": "1.1.0", "metric": "fast", "metrics": [{"name": "x"}]}),
    );

    let outcomes =
        validate_path(dir.path(), Some(&Version::new(1, 1, 0)), &ctx()).unwrap();
    assert_eq!(outcomes.len(), 1);
    let result = &outcomes[0].result;
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 2, "{:?}", result.errors);
    assert!(result.errors.iter().any(|e| e.starts_with("/metric")));
}

#[test]
fn test_old_record_against_new_generation_only_warns() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "r.json", json!({"schema_version": "1.0.0", "metric": 1}));

    let outcomes =
        validate_path(dir.path(), Some(&Version::new(1, 1, 0)), &ctx()).unwrap();
    let result = &outcomes[0].result;
    assert!(result.valid);
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_report_over_mixed_corpus() {
    let input = tempfile::tempdir().unwrap();
    legacy_corpus(input.path());
    write(input.path(), "zz_new.json", json!({"schema_version": "1.1.0"}));
    write(input.path(), "zz_future.json", json!({"schema_version": "2.0.0"}));

    let args = ReportArgs {
        input: input.path().to_path_buf(),
        to: None,
        policy: None,
    };
    let report = build_report(&args, &ctx()).unwrap();
    assert_eq!(report.files_processed, 4);
    assert_eq!(report.files_succeeded, 3);
    assert_eq!(report.files_failed, 1);
    assert_eq!(report.source_version, Some(Version::new(1, 0, 0)));
    assert!(report.is_mixed());
    assert!(report.errors[0].starts_with("zz_future.json: no migration path from 2.0.0"));
}
