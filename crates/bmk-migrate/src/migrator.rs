//! # Single-Document Migration
//!
//! [`Migrator`] detects a document's version, asks the registry for a path
//! to the target, and runs each step in order, feeding every step's output
//! into the next.
//!
//! ## Fail-Fast Invariant
//!
//! A failing step aborts the whole call and no partial result is returned.
//! [`Migrator::migrate_file`] writes the output only after the migration and
//! serialization have fully succeeded, via a temporary file in the output
//! directory that is renamed into place. A failed call leaves no output file.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use bmk_core::{detect_version, set_schema_version, Document, Version};

use crate::error::MigrationError;
use crate::migration::Migration;
use crate::registry::MigrationRegistry;

/// Applies registered migrations to documents and files.
#[derive(Debug, Clone)]
pub struct Migrator {
    registry: Arc<MigrationRegistry>,
}

impl Migrator {
    /// Create a migrator over a shared registry.
    pub fn new(registry: Arc<MigrationRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this migrator resolves paths in.
    pub fn registry(&self) -> &MigrationRegistry {
        &self.registry
    }

    /// Migrate a document to `target`.
    ///
    /// A document already at `target` is returned unchanged. The input is
    /// never modified.
    ///
    /// # Errors
    ///
    /// - [`MigrationError::MalformedVersion`] for an unusable `schema_version`.
    /// - [`MigrationError::NoMigrationPath`] when the registry has no route.
    /// - [`MigrationError::StepFailed`] for the first failing step.
    pub fn migrate_data(&self, doc: &Document, target: &Version) -> Result<Document, MigrationError> {
        let current = detect_version(doc)?;
        if current == *target {
            return Ok(doc.clone());
        }

        let path = self.registry.resolve_path(&current, target)?;
        let mut state: Option<Document> = None;
        for step in &path {
            let input = state.as_ref().unwrap_or(doc);
            let output = apply_step(step, input)?;
            tracing::debug!(from = %step.from(), to = %step.to(), "applied migration step");
            state = Some(output);
        }

        state.ok_or(MigrationError::NoMigrationPath {
            from: current,
            to: *target,
        })
    }

    /// Migrate the JSON file at `input` and write the result to `output`.
    ///
    /// Missing parent directories of `output` are created. Returns the
    /// version the input was detected at.
    ///
    /// # Errors
    ///
    /// Any read, parse, migration, serialization or write failure. On error
    /// no file exists at `output` unless one existed before the call.
    pub fn migrate_file(
        &self,
        input: &Path,
        output: &Path,
        target: &Version,
    ) -> Result<Version, MigrationError> {
        let doc = read_document(input)?;
        let source = detect_version(&doc)?;
        self.write_migrated(&doc, output, target)?;
        tracing::debug!(input = %input.display(), from = %source, "migrated file");
        Ok(source)
    }

    /// Migrate an already-read document and write the result to `output`.
    ///
    /// # Errors
    ///
    /// Same as [`Migrator::migrate_data`], plus serialization and write
    /// failures. On error nothing is written.
    pub fn write_migrated(
        &self,
        doc: &Document,
        output: &Path,
        target: &Version,
    ) -> Result<(), MigrationError> {
        let migrated = self.migrate_data(doc, target)?;
        let mut rendered = serde_json::to_vec_pretty(&migrated)?;
        rendered.push(b'\n');

        write_atomically(output, &rendered)?;
        tracing::debug!(output = %output.display(), to = %target, "wrote migrated document");
        Ok(())
    }
}

/// Read and parse a JSON document file.
///
/// # Errors
///
/// [`MigrationError::Io`] if the file cannot be read,
/// [`MigrationError::InvalidDocument`] if it is not JSON.
pub fn read_document(path: &Path) -> Result<Document, MigrationError> {
    let bytes = std::fs::read(path).map_err(|e| MigrationError::Io {
        path: path.display().to_string(),
        source: e,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| MigrationError::InvalidDocument {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

/// Run one step and pin the result to the step's target version.
///
/// A step that leaves `schema_version` out gets it stamped; a step that
/// writes a different version is treated as a failed step.
fn apply_step(step: &Migration, input: &Document) -> Result<Document, MigrationError> {
    let failed = |reason: String| MigrationError::StepFailed {
        from: step.from(),
        to: step.to(),
        reason,
    };

    let mut output = step.apply(input).map_err(|e| failed(e.to_string()))?;
    if !output.is_object() {
        return Err(failed("step did not produce a JSON object".to_string()));
    }

    match output.get(bmk_core::SCHEMA_VERSION_FIELD) {
        None => set_schema_version(&mut output, &step.to()),
        Some(_) => {
            let produced = detect_version(&output).map_err(|e| failed(e.to_string()))?;
            if produced != step.to() {
                return Err(failed(format!(
                    "step produced schema_version {produced}, expected {}",
                    step.to()
                )));
            }
        }
    }
    Ok(output)
}

/// Write `contents` to `path` through a temporary sibling file.
fn write_atomically(path: &Path, contents: &[u8]) -> Result<(), MigrationError> {
    let io_err = |source: std::io::Error| MigrationError::Io {
        path: path.display().to_string(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(io_err)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent).map_err(io_err)?;
    tmp.write_all(contents).map_err(io_err)?;
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}
