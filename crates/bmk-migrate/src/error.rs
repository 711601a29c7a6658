//! # Migration Errors
//!
//! One enum covers registration conflicts, path resolution, step failures
//! and the I/O around single-file and batch migration.
//!
//! Single-document operations return these directly and produce no partial
//! artifact. Batch operations convert item-level errors into report entries
//! and only return [`MigrationError::Traversal`] or
//! [`MigrationError::Cancelled`] themselves.

use bmk_core::{Version, VersionError};
use thiserror::Error;

use crate::report::MigrationReport;

/// Errors returned by migration operations.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// A migration for this `(from, to)` pair is already registered.
    #[error("migration {from} -> {to} is already registered")]
    DuplicateMigration {
        /// Source version of the rejected migration.
        from: Version,
        /// Target version of the rejected migration.
        to: Version,
    },

    /// No registered route connects the two versions.
    #[error("no migration path from {from} to {to}")]
    NoMigrationPath {
        /// Version the document is at.
        from: Version,
        /// Version that was requested.
        to: Version,
    },

    /// A transformation unit failed; later steps were not run.
    #[error("migration step {from} -> {to} failed: {reason}")]
    StepFailed {
        /// Source version of the failing step.
        from: Version,
        /// Target version of the failing step.
        to: Version,
        /// What the transformation reported.
        reason: String,
    },

    /// The document declares an unusable `schema_version`.
    #[error("invalid schema_version: {0}")]
    MalformedVersion(#[from] VersionError),

    /// The input file is not well-formed JSON.
    #[error("invalid document {path}: {reason}")]
    InvalidDocument {
        /// Path of the rejected file.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path of the file or directory involved.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The migrated document could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The input collection could not be enumerated at all.
    #[error("cannot traverse {path}: {reason}")]
    Traversal {
        /// Root of the collection.
        path: String,
        /// Why enumeration failed.
        reason: String,
    },

    /// A batch was cancelled between items.
    #[error("batch cancelled after {} item(s)", .report.files_processed)]
    Cancelled {
        /// What had been processed when cancellation was observed.
        report: Box<MigrationReport>,
    },
}
