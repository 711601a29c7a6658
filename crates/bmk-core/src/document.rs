//! # Benchmark Documents
//!
//! A benchmark record is an arbitrary JSON value, normally an object. The
//! only field this workspace interprets is its version marker.
//!
//! ## Version Detection
//!
//! 1. A top-level `schema_version` string is authoritative.
//! 2. Otherwise, the legacy marker `metadata.data_version == "1.0"` maps
//!    to `1.0.0`.
//! 3. Otherwise the record is assumed to be `1.0.0`.
//!
//! A `schema_version` that is present but not a canonical version string is
//! an error here. Callers that want a fallback for that case (schema
//! auto-detection) decide it themselves.

use serde_json::Value;

use crate::error::VersionError;
use crate::version::Version;

/// A benchmark record.
pub type Document = Value;

/// Name of the top-level version marker.
pub const SCHEMA_VERSION_FIELD: &str = "schema_version";

/// Value of `metadata.data_version` written by pre-versioned producers.
pub const LEGACY_DATA_VERSION: &str = "1.0";

/// Where a detected version came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionSource {
    /// Top-level `schema_version`.
    Declared,
    /// Legacy `metadata.data_version` marker.
    LegacyMarker,
    /// Nothing found; [`Version::DEFAULT`] assumed.
    Assumed,
}

/// A version together with how it was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectedVersion {
    /// The detected version.
    pub version: Version,
    /// Which detection rule produced it.
    pub source: VersionSource,
}

/// Detect the schema version a document claims to follow.
///
/// # Errors
///
/// Returns [`VersionError`] when `schema_version` is present but is not a
/// string or not a canonical version.
pub fn detect_version(doc: &Document) -> Result<Version, VersionError> {
    detect_version_with_source(doc).map(|d| d.version)
}

/// Like [`detect_version`], also reporting which rule matched.
pub fn detect_version_with_source(doc: &Document) -> Result<DetectedVersion, VersionError> {
    match doc.get(SCHEMA_VERSION_FIELD) {
        Some(Value::String(s)) => Ok(DetectedVersion {
            version: Version::parse(s)?,
            source: VersionSource::Declared,
        }),
        Some(other) => Err(VersionError::NotAString {
            found: json_type_name(other),
        }),
        None => {
            let legacy = doc
                .get("metadata")
                .and_then(|m| m.get("data_version"))
                .and_then(Value::as_str)
                == Some(LEGACY_DATA_VERSION);
            Ok(DetectedVersion {
                version: Version::DEFAULT,
                source: if legacy {
                    VersionSource::LegacyMarker
                } else {
                    VersionSource::Assumed
                },
            })
        }
    }
}

/// Detect the version, treating an unusable `schema_version` as absent.
///
/// Returns `None` only when `schema_version` is present but unusable, so the
/// caller can choose its own fallback.
pub fn detect_version_lenient(doc: &Document) -> Option<Version> {
    detect_version(doc).ok()
}

/// Write `version` into the document's top-level `schema_version`.
///
/// Has no effect on non-object documents.
pub fn set_schema_version(doc: &mut Document, version: &Version) {
    if let Value::Object(map) = doc {
        map.insert(
            SCHEMA_VERSION_FIELD.to_string(),
            Value::String(version.to_string()),
        );
    }
}

/// JSON type name for diagnostics.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
