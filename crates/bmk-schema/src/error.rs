//! Errors returned by schema loading and document loading.
//!
//! Structural violations are not errors at this level: they are reported in
//! [`ValidationResult`](crate::ValidationResult). Only infrastructure
//! failures surface as [`SchemaError`].

use thiserror::Error;

/// Errors returned by schema operations.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// The schema definition is missing, unreadable, or not valid JSON, or
    /// declares a malformed `version`.
    #[error("failed to load schema {path}: {reason}")]
    SchemaLoad {
        /// Path or identifier of the schema that failed to load.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },

    /// The schema parsed but could not be compiled into a validator.
    #[error("failed to compile schema {path}: {reason}")]
    SchemaCompile {
        /// Path or identifier of the schema.
        path: String,
        /// Human-readable reason.
        reason: String,
    },

    /// A document file could not be read.
    #[error("failed to load document {path}: {reason}")]
    DocumentLoad {
        /// Path to the document that failed to load.
        path: String,
        /// Human-readable reason for the failure.
        reason: String,
    },
}
