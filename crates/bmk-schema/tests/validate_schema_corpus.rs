//! Integration test: the schema generations shipped in `schemas/` load,
//! compile, and agree with the version rules.

use std::path::PathBuf;

use bmk_core::Version;
use bmk_schema::{SchemaManager, SchemaValidator};
use serde_json::json;

/// Find the repository root.
fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop(); // crates/
    dir.pop(); // repo root
    dir
}

fn manager() -> SchemaManager {
    SchemaManager::new(repo_root().join("schemas"))
}

#[test]
fn test_shipped_generations_are_discovered() {
    let generations = manager().available_generations().expect("schemas/ readable");
    assert!(generations.contains(&Version::new(1, 0, 0)));
    assert!(generations.contains(&Version::new(1, 1, 0)));
}

#[test]
fn test_every_shipped_generation_compiles_with_matching_version() {
    let manager = manager();
    for generation in manager.available_generations().unwrap() {
        let validator = manager
            .get_validator(&generation)
            .unwrap_or_else(|e| panic!("generation {generation} failed to load: {e}"));
        assert_eq!(
            validator.version().generation(),
            generation.generation(),
            "schema in v{} declares version {}",
            generation.generation(),
            validator.version()
        );
    }
}

#[test]
fn test_record_matching_generation_is_clean() {
    let validator = SchemaValidator::load(&repo_root().join("schemas"), &Version::new(1, 0, 0))
        .expect("v1.0 schema loads");
    let result = validator.validate_bytes(br#"{"schema_version":"1.0.0","metric":41.9}"#);
    assert!(result.valid, "errors: {:?}", result.errors);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_record_older_than_generation_warns() {
    let validator = SchemaValidator::load(&repo_root().join("schemas"), &Version::new(1, 1, 0))
        .expect("v1.1 schema loads");
    let result = validator.validate_bytes(br#"{"schema_version":"1.0.0","metric":41.9}"#);
    assert!(result.valid, "errors: {:?}", result.errors);
    assert_eq!(result.warnings.len(), 1);
    assert!(result.warnings[0].contains("1.1.0"));
    assert!(result.warnings[0].contains("1.0.0"));
}

#[test]
fn test_legacy_record_validates_against_v1_0() {
    let doc = json!({
        "benchmark": "stream-triad",
        "metric": 118.4,
        "unit": "GB/s",
        "metadata": {"data_version": "1.0", "instance_type": "c7g.large"},
        "results": [{"name": "copy", "value": 120.1}, {"name": "triad", "value": 118.4}]
    });
    let result = manager()
        .validate_with_auto_detection(&serde_json::to_vec(&doc).unwrap())
        .unwrap();
    assert!(result.valid, "errors: {:?}", result.errors);
    assert_eq!(result.data_version, Version::new(1, 0, 0));
}

#[test]
fn test_structural_violations_are_reported_per_field() {
    let doc = json!({
        "schema_version": "1.1.0",
        "metric": "fast",
        "metrics": [{"name": "", "value": 1}, {"value": "x"}]
    });
    let result = manager()
        .validate_with_auto_detection(&serde_json::to_vec(&doc).unwrap())
        .unwrap();
    assert!(!result.valid);
    assert!(result.errors.iter().any(|e| e.starts_with("/metric:")));
    assert!(result.errors.iter().any(|e| e.starts_with("/metrics/0/name")));
    assert!(result.errors.iter().any(|e| e.starts_with("/metrics/1")));
}
