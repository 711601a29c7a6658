//! # Validator Cache
//!
//! [`SchemaManager`] compiles each schema generation at most once and
//! hands out shared [`SchemaValidator`]s.
//!
//! ## Concurrency
//!
//! The cache is shared mutable state. Lookup and compile-on-miss run inside
//! one `parking_lot::Mutex` critical section, so two concurrent callers
//! asking for the same version never compile it twice and never overwrite
//! each other's entry. Validators themselves are immutable and are used
//! outside the lock.
//!
//! ## Lifetime
//!
//! Entries are never evicted. The cache lives exactly as long as the
//! manager that owns it; there is no process-wide instance.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bmk_core::{detect_version, Document, Version};
use parking_lot::Mutex;

use crate::error::SchemaError;
use crate::validator::{schema_path, SchemaValidator, ValidationResult};

/// Owns compiled validators for the generations found under one base directory.
#[derive(Debug)]
pub struct SchemaManager {
    base_dir: PathBuf,
    /// Compiled validators keyed by the requested version's string form.
    cache: Mutex<HashMap<String, Arc<SchemaValidator>>>,
}

impl SchemaManager {
    /// Create a manager for schemas stored beneath `base_dir`.
    ///
    /// Nothing is loaded until a validator is first requested.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// The schema base directory.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Return the validator for `version`, compiling it on first request.
    ///
    /// # Errors
    ///
    /// Propagates [`SchemaError::SchemaLoad`] / [`SchemaError::SchemaCompile`]
    /// from the first load. A failed load is not cached.
    pub fn get_validator(&self, version: &Version) -> Result<Arc<SchemaValidator>, SchemaError> {
        let key = version.to_string();
        let mut cache = self.cache.lock();
        if let Some(validator) = cache.get(&key) {
            return Ok(Arc::clone(validator));
        }

        let validator = Arc::new(SchemaValidator::load(&self.base_dir, version)?);
        tracing::debug!(
            version = %key,
            source = validator.source(),
            "cached schema validator"
        );
        cache.insert(key, Arc::clone(&validator));
        Ok(validator)
    }

    /// Versions currently held in the cache, sorted.
    pub fn cached_versions(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.cache.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Schema generations present on disk, sorted ascending.
    ///
    /// A generation is a `v<major>.<minor>` directory containing a schema
    /// file; it is reported as `major.minor.0`. Other entries are ignored.
    pub fn available_generations(&self) -> Result<Vec<Version>, SchemaError> {
        let entries = std::fs::read_dir(&self.base_dir).map_err(|e| SchemaError::SchemaLoad {
            path: self.base_dir.display().to_string(),
            reason: format!("cannot read schema directory: {e}"),
        })?;

        let mut generations = Vec::new();
        for entry in entries.flatten() {
            let name = entry.file_name();
            let Some(label) = name.to_str().and_then(|n| n.strip_prefix('v')) else {
                continue;
            };
            let Ok(version) = Version::parse(&format!("{label}.0")) else {
                continue;
            };
            if schema_path(&self.base_dir, &version).is_file() {
                generations.push(version);
            }
        }
        generations.sort();
        Ok(generations)
    }

    /// The newest generation on disk, or `1.0.0` if none can be found.
    pub fn latest_generation(&self) -> Version {
        self.available_generations()
            .ok()
            .and_then(|g| g.last().copied())
            .unwrap_or(Version::DEFAULT)
    }

    /// Validate a document whose version is not known in advance.
    ///
    /// - Not JSON: invalid result, no schema is loaded.
    /// - No declared version: validated as `1.0.0` (legacy rule applies).
    /// - Declared version unparsable: validated against the latest
    ///   generation on disk, on the assumption that it comes from a newer
    ///   producer rather than being garbage.
    ///
    /// # Errors
    ///
    /// Only schema loading failures.
    pub fn validate_with_auto_detection(
        &self,
        bytes: &[u8],
    ) -> Result<ValidationResult, SchemaError> {
        let doc: Document = match serde_json::from_slice(bytes) {
            Ok(doc) => doc,
            Err(e) => return Ok(ValidationResult::invalid_json(Version::DEFAULT, e)),
        };

        let version = match detect_version(&doc) {
            Ok(v) => v,
            Err(e) => {
                let latest = self.latest_generation();
                tracing::debug!(error = %e, fallback = %latest, "using latest schema generation");
                latest
            }
        };

        Ok(self.get_validator(&version)?.validate_value(&doc))
    }

    /// Read a document file and validate it with auto-detection.
    pub fn validate_file_with_auto_detection(
        &self,
        path: &Path,
    ) -> Result<ValidationResult, SchemaError> {
        let bytes = std::fs::read(path).map_err(|e| SchemaError::DocumentLoad {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        self.validate_with_auto_detection(&bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread;

    fn write_generation(base: &Path, version: &Version, declared: &str) {
        let path = schema_path(base, version);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let schema = json!({
            "version": declared,
            "type": "object",
            "properties": {"metric": {"type": "number"}}
        });
        std::fs::write(&path, serde_json::to_vec_pretty(&schema).unwrap()).unwrap();
    }

    fn two_generations() -> tempfile::TempDir {
        let tmp = tempfile::tempdir().unwrap();
        write_generation(tmp.path(), &Version::new(1, 0, 0), "1.0.0");
        write_generation(tmp.path(), &Version::new(1, 1, 0), "1.1.0");
        tmp
    }

    #[test]
    fn test_cache_returns_same_instance() {
        let tmp = two_generations();
        let manager = SchemaManager::new(tmp.path());
        let a = manager.get_validator(&Version::new(1, 0, 0)).unwrap();
        let b = manager.get_validator(&Version::new(1, 0, 0)).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(manager.cached_versions(), vec!["1.0.0".to_string()]);
    }

    #[test]
    fn test_cache_survives_schema_file_removal() {
        let tmp = two_generations();
        let manager = SchemaManager::new(tmp.path());
        manager.get_validator(&Version::new(1, 1, 0)).unwrap();
        std::fs::remove_dir_all(tmp.path().join("v1.1")).unwrap();
        assert!(manager.get_validator(&Version::new(1, 1, 0)).is_ok());
    }

    #[test]
    fn test_missing_generation_is_load_error_and_not_cached() {
        let tmp = two_generations();
        let manager = SchemaManager::new(tmp.path());
        let err = manager.get_validator(&Version::new(2, 0, 0)).unwrap_err();
        assert!(matches!(err, SchemaError::SchemaLoad { .. }));
        assert!(manager.cached_versions().is_empty());
    }

    #[test]
    fn test_available_and_latest_generations() {
        let tmp = two_generations();
        std::fs::create_dir_all(tmp.path().join("vnext")).unwrap();
        std::fs::create_dir_all(tmp.path().join("v3.0")).unwrap();
        let manager = SchemaManager::new(tmp.path());
        assert_eq!(
            manager.available_generations().unwrap(),
            vec![Version::new(1, 0, 0), Version::new(1, 1, 0)]
        );
        assert_eq!(manager.latest_generation(), Version::new(1, 1, 0));
    }

    #[test]
    fn test_latest_generation_defaults_when_base_missing() {
        let manager = SchemaManager::new("/nonexistent/schemas");
        assert!(manager.available_generations().is_err());
        assert_eq!(manager.latest_generation(), Version::DEFAULT);
    }

    #[test]
    fn test_auto_detection_uses_declared_version() {
        let tmp = two_generations();
        let manager = SchemaManager::new(tmp.path());
        let result = manager
            .validate_with_auto_detection(br#"{"schema_version":"1.1.0","metric":2}"#)
            .unwrap();
        assert!(result.valid);
        assert_eq!(result.schema_version, Version::new(1, 1, 0));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_auto_detection_defaults_legacy_documents() {
        let tmp = two_generations();
        let manager = SchemaManager::new(tmp.path());
        let result = manager
            .validate_with_auto_detection(br#"{"value": 1}"#)
            .unwrap();
        assert_eq!(result.schema_version, Version::new(1, 0, 0));
        assert_eq!(result.data_version, Version::new(1, 0, 0));
    }

    #[test]
    fn test_auto_detection_falls_back_to_latest_on_unparsable_version() {
        let tmp = two_generations();
        let manager = SchemaManager::new(tmp.path());
        let result = manager
            .validate_with_auto_detection(br#"{"schema_version":"1.2","metric":2}"#)
            .unwrap();
        assert_eq!(result.schema_version, Version::new(1, 1, 0));
        assert!(result.valid);
    }

    #[test]
    fn test_auto_detection_invalid_json() {
        let manager = SchemaManager::new("/nonexistent/schemas");
        let result = manager.validate_with_auto_detection(b"{{").unwrap();
        assert!(!result.valid);
        assert!(result.errors[0].starts_with("invalid JSON"));
    }

    #[test]
    fn test_concurrent_requests_share_one_validator() {
        let tmp = two_generations();
        let manager = Arc::new(SchemaManager::new(tmp.path()));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.get_validator(&Version::new(1, 0, 0)).unwrap())
            })
            .collect();
        let validators: Vec<Arc<SchemaValidator>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        for v in &validators[1..] {
            assert!(Arc::ptr_eq(&validators[0], v));
        }
        assert_eq!(manager.cached_versions().len(), 1);
    }
}
