//! # Migration Units
//!
//! A [`Migration`] upgrades a document from exactly one schema version to
//! exactly one other. It is a plain value: the `(from, to)` key, a
//! description, and a transformation function. There is no trait to
//! implement; registering a migration means handing the registry one of
//! these values.
//!
//! Transformations take the document by shared reference and return a new
//! one, so the input of every step stays intact for diagnostics.

use std::fmt;

use bmk_core::{Document, Version};
use thiserror::Error;

/// Failure reported by a transformation function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct MigrationStepError(pub String);

impl MigrationStepError {
    /// Build a step error from any message.
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Signature of a transformation unit.
pub type TransformFn = fn(&Document) -> Result<Document, MigrationStepError>;

/// A registered transformation between two schema versions.
#[derive(Clone)]
pub struct Migration {
    from: Version,
    to: Version,
    description: String,
    transform: TransformFn,
}

impl fmt::Debug for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Migration")
            .field("from", &self.from)
            .field("to", &self.to)
            .field("description", &self.description)
            .finish()
    }
}

impl fmt::Display for Migration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}: {}", self.from, self.to, self.description)
    }
}

impl Migration {
    /// Create a migration from `from` to `to`.
    pub fn new(
        from: Version,
        to: Version,
        description: impl Into<String>,
        transform: TransformFn,
    ) -> Self {
        Self {
            from,
            to,
            description: description.into(),
            transform,
        }
    }

    /// Source version.
    pub fn from(&self) -> Version {
        self.from
    }

    /// Target version.
    pub fn to(&self) -> Version {
        self.to
    }

    /// Registry key.
    pub fn key(&self) -> (Version, Version) {
        (self.from, self.to)
    }

    /// Human-readable summary of what the migration changes.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Run the transformation. The input is never modified.
    pub fn apply(&self, doc: &Document) -> Result<Document, MigrationStepError> {
        (self.transform)(doc)
    }
}
