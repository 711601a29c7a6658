//! # Generation Validator
//!
//! Compiles one schema generation of the benchmark record format and checks
//! documents against it (JSON Schema Draft 2020-12).
//!
//! ## Two Orthogonal Checks
//!
//! 1. **Structure.** Every violation reported by the compiled schema goes
//!    into `errors`, not just the first one. Any error makes the result
//!    invalid.
//! 2. **Version.** The document's declared version must satisfy the
//!    schema's own `version` (see [`Version::is_compatible_with`]). A
//!    mismatch is a warning and never changes `valid` on its own.
//!
//! ## Failure Policy
//!
//! Validation never fails for bad input: unparsable bytes produce an invalid
//! result with an `invalid JSON: …` entry. Only loading or compiling the
//! schema itself returns [`SchemaError`].

use std::fmt;
use std::path::{Path, PathBuf};

use bmk_core::{detect_version, Document, Version};
use jsonschema::{Retrieve, Uri};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemaError;

/// File name of a generation's schema inside its `v<major>.<minor>` directory.
pub const SCHEMA_FILE_NAME: &str = "benchmark-result.json";

/// Source label used for schemas that were not read from a file.
const INLINE_SOURCE: &str = "<inline>";

/// Location of the schema for `version` beneath `base_dir`.
///
/// Only `major.minor` selects the directory; the patch level is ignored.
pub fn schema_path(base_dir: &Path, version: &Version) -> PathBuf {
    base_dir
        .join(format!("v{}", version.generation()))
        .join(SCHEMA_FILE_NAME)
}

/// Refuses every external `$ref`.
///
/// Benchmark schemas are self-contained (`#/$defs/...` only). Anything else
/// would mean a network fetch, so it fails compilation instead.
struct NoRemoteRetriever;

impl Retrieve for NoRemoteRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema reference not allowed: {}", uri.as_str()).into())
    }
}

// ---------------------------------------------------------------------------
// ValidationResult
// ---------------------------------------------------------------------------

/// Outcome of validating one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// True iff there are no structural errors.
    pub valid: bool,
    /// Structural violations, one entry per violation.
    pub errors: Vec<String>,
    /// Version-compatibility notes. Never affect `valid`.
    pub warnings: Vec<String>,
    /// The validator's own declared version.
    pub schema_version: Version,
    /// The version the document declares (or the detected default).
    pub data_version: Version,
}

impl ValidationResult {
    /// Result for input that is not well-formed JSON.
    pub fn invalid_json(schema_version: Version, reason: impl fmt::Display) -> Self {
        Self {
            valid: false,
            errors: vec![format!("invalid JSON: {reason}")],
            warnings: Vec::new(),
            schema_version,
            data_version: Version::DEFAULT,
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.valid { "valid" } else { "invalid" };
        write!(
            f,
            "{status} (schema {}, data {}; {} error(s), {} warning(s))",
            self.schema_version,
            self.data_version,
            self.errors.len(),
            self.warnings.len()
        )
    }
}

// ---------------------------------------------------------------------------
// SchemaValidator
// ---------------------------------------------------------------------------

/// A compiled validator for one schema generation.
///
/// Immutable once built, so one instance can be shared across threads
/// (`Arc<SchemaValidator>`) without further locking.
pub struct SchemaValidator {
    /// Where the schema came from (file path or `<inline>`).
    source: String,
    /// The schema's own `version` field, or `1.0.0` when absent.
    version: Version,
    compiled: jsonschema::Validator,
}

impl fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaValidator")
            .field("source", &self.source)
            .field("version", &self.version)
            .finish()
    }
}

impl SchemaValidator {
    /// Load the validator for `version`'s generation beneath `base_dir`.
    ///
    /// Reads `<base_dir>/v<major>.<minor>/benchmark-result.json`.
    ///
    /// # Errors
    ///
    /// [`SchemaError::SchemaLoad`] if the file is missing, unreadable or not
    /// JSON; [`SchemaError::SchemaCompile`] if it is not a valid schema.
    pub fn load(base_dir: &Path, version: &Version) -> Result<Self, SchemaError> {
        Self::from_path(&schema_path(base_dir, version))
    }

    /// Load and compile the schema definition at `path`.
    pub fn from_path(path: &Path) -> Result<Self, SchemaError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SchemaError::SchemaLoad {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let schema: Value =
            serde_json::from_str(&content).map_err(|e| SchemaError::SchemaLoad {
                path: path.display().to_string(),
                reason: format!("invalid JSON: {e}"),
            })?;

        Self::compile(&schema, path.display().to_string())
    }

    /// Compile an in-memory schema definition.
    pub fn from_schema(schema: &Value) -> Result<Self, SchemaError> {
        Self::compile(schema, INLINE_SOURCE.to_string())
    }

    fn compile(schema: &Value, source: String) -> Result<Self, SchemaError> {
        let version = match schema.get("version") {
            None => Version::DEFAULT,
            Some(Value::String(s)) => {
                Version::parse(s).map_err(|e| SchemaError::SchemaLoad {
                    path: source.clone(),
                    reason: format!("invalid schema version: {e}"),
                })?
            }
            Some(other) => {
                return Err(SchemaError::SchemaLoad {
                    path: source,
                    reason: format!(
                        "schema version must be a string, found {}",
                        bmk_core::json_type_name(other)
                    ),
                })
            }
        };

        let compiled = jsonschema::options()
            .with_draft(jsonschema::Draft::Draft202012)
            .with_retriever(NoRemoteRetriever)
            .build(schema)
            .map_err(|e| SchemaError::SchemaCompile {
                path: source.clone(),
                reason: e.to_string(),
            })?;

        tracing::debug!(source = %source, version = %version, "compiled schema");

        Ok(Self {
            source,
            version,
            compiled,
        })
    }

    /// The schema's declared version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Where the schema was loaded from.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Validate raw document bytes.
    ///
    /// Bytes that are not JSON produce an invalid result rather than an error.
    pub fn validate_bytes(&self, bytes: &[u8]) -> ValidationResult {
        match serde_json::from_slice::<Document>(bytes) {
            Ok(doc) => self.validate_value(&doc),
            Err(e) => ValidationResult::invalid_json(self.version, e),
        }
    }

    /// Validate an already-materialized value by serializing it first.
    ///
    /// Used for records built in code rather than read from storage. A value
    /// that fails to serialize is reported like unparsable input.
    pub fn validate_serializable<T: Serialize + ?Sized>(&self, value: &T) -> ValidationResult {
        match serde_json::to_vec(value) {
            Ok(bytes) => self.validate_bytes(&bytes),
            Err(e) => ValidationResult::invalid_json(self.version, e),
        }
    }

    /// Validate a parsed document.
    pub fn validate_value(&self, doc: &Document) -> ValidationResult {
        let errors: Vec<String> = self
            .compiled
            .iter_errors(doc)
            .map(|err| {
                let path = err.instance_path.to_string();
                if path.is_empty() {
                    format!("(root): {err}")
                } else {
                    format!("{path}: {err}")
                }
            })
            .collect();

        let mut warnings = Vec::new();
        let data_version = match detect_version(doc) {
            Ok(v) => {
                if !v.is_compatible_with(&self.version) {
                    warnings.push(format!(
                        "document version {v} is not compatible with schema version {}",
                        self.version
                    ));
                }
                v
            }
            Err(e) => {
                warnings.push(format!("{e}; version compatibility not checked"));
                Version::DEFAULT
            }
        };

        ValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings,
            schema_version: self.version,
            data_version,
        }
    }

    /// Read and validate a document file.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DocumentLoad`] only if the file cannot be read. Parse
    /// and structural failures are reported in the result.
    pub fn validate_file(&self, path: &Path) -> Result<ValidationResult, SchemaError> {
        let bytes = std::fs::read(path).map_err(|e| SchemaError::DocumentLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Ok(self.validate_bytes(&bytes))
    }
}
