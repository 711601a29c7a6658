//! Aggregate outcome of a batch run.

use std::collections::BTreeMap;
use std::fmt;

use bmk_core::Version;
use serde::{Deserialize, Serialize};

/// Summary of one batch over a collection of documents.
///
/// `source_version` is the version of the first document read in traversal
/// order (traversal is sorted by file name). `source_versions` counts every
/// detected version and does not depend on order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationReport {
    /// Version of the first document whose version could be read.
    pub source_version: Option<Version>,
    /// Version the batch migrates (or would migrate) to.
    pub target_version: Version,
    /// Items attempted.
    pub files_processed: usize,
    /// Items migrated, or with a resolvable path in a dry run.
    pub files_succeeded: usize,
    /// Items that failed, one `errors` entry each.
    pub files_failed: usize,
    /// One message per failed item, prefixed with its relative path.
    pub errors: Vec<String>,
    /// Number of items detected at each source version.
    #[serde(default)]
    pub source_versions: BTreeMap<Version, usize>,
}

impl MigrationReport {
    /// An empty report for a batch targeting `target_version`.
    pub fn new(target_version: Version) -> Self {
        Self {
            source_version: None,
            target_version,
            files_processed: 0,
            files_succeeded: 0,
            files_failed: 0,
            errors: Vec::new(),
            source_versions: BTreeMap::new(),
        }
    }

    /// Note the detected version of an item.
    pub fn observe_source(&mut self, version: Version) {
        self.source_version.get_or_insert(version);
        *self.source_versions.entry(version).or_default() += 1;
    }

    /// Count a successful item at `source` version.
    pub fn record_success(&mut self, source: Version) {
        self.observe_source(source);
        self.files_processed += 1;
        self.files_succeeded += 1;
    }

    /// Count a failed item.
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.files_processed += 1;
        self.files_failed += 1;
        self.errors.push(message.into());
    }

    /// True when no item failed.
    pub fn is_success(&self) -> bool {
        self.files_failed == 0
    }

    /// True when items were seen at more than one source version.
    pub fn is_mixed(&self) -> bool {
        self.source_versions.len() > 1
    }
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self
            .source_version
            .map_or_else(|| "unknown".to_string(), |v| v.to_string());
        write!(
            f,
            "{source} -> {}: {}/{} succeeded, {} failed",
            self.target_version, self.files_succeeded, self.files_processed, self.files_failed
        )
    }
}
