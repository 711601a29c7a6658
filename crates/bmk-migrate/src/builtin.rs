//! # Built-in Migrations
//!
//! Transformation units shipped with the workspace and registered by
//! [`MigrationRegistry::with_builtin`](crate::MigrationRegistry::with_builtin).
//!
//! ## 1.0.0 → 1.1.0
//!
//! - Sets `schema_version` to `1.1.0`.
//! - Moves the legacy marker `metadata.data_version` to
//!   `metadata.legacy_data_version`.
//! - When `metrics` is absent and `metric` is a number, adds
//!   `metrics: [{"name": "metric", "value": <metric>, "unit": <unit>}]`.
//!   `metric` and `unit` stay in place.
//!
//! Nothing is dropped: every input field is present in the output, either
//! unchanged or under its new name.

use bmk_core::{json_type_name, Document, Version, SCHEMA_VERSION_FIELD};
use serde_json::{Map, Value};

use crate::migration::{Migration, MigrationStepError};

/// Every built-in migration.
pub fn builtin_migrations() -> Vec<Migration> {
    vec![Migration::new(
        Version::new(1, 0, 0),
        Version::new(1, 1, 0),
        "add explicit schema_version; move legacy data_version marker; add metrics list",
        upgrade_1_0_to_1_1,
    )]
}

fn upgrade_1_0_to_1_1(doc: &Document) -> Result<Document, MigrationStepError> {
    let Value::Object(source) = doc else {
        return Err(MigrationStepError::new(format!(
            "expected a JSON object, found {}",
            json_type_name(doc)
        )));
    };
    let mut out = source.clone();

    if let Some(Value::Object(metadata)) = out.get_mut("metadata") {
        if let Some(marker) = metadata.remove("data_version") {
            metadata.insert("legacy_data_version".to_string(), marker);
        }
    }

    if !out.contains_key("metrics") {
        let metric = out.get("metric").filter(|v| v.is_number()).cloned();
        if let Some(value) = metric {
            let mut entry = Map::new();
            entry.insert("name".to_string(), Value::String("metric".to_string()));
            entry.insert("value".to_string(), value);
            if let Some(unit) = out.get("unit").filter(|v| v.is_string()) {
                entry.insert("unit".to_string(), unit.clone());
            }
            out.insert("metrics".to_string(), Value::Array(vec![Value::Object(entry)]));
        }
    }

    out.insert(
        SCHEMA_VERSION_FIELD.to_string(),
        Value::String("1.1.0".to_string()),
    );
    Ok(Value::Object(out))
}
