//! # Batch Migration
//!
//! [`BatchMigrator`] runs the [`Migrator`] over every `*.json` file beneath
//! a directory, one item at a time.
//!
//! ## Failure Isolation
//!
//! An item that cannot be read, parsed or migrated is logged, reported to
//! the observer, recorded in the [`MigrationReport`] and skipped. Only a root
//! that cannot be enumerated fails the whole batch.
//!
//! ## Ordering
//!
//! Items are visited sorted by file name at every directory level, so runs
//! over the same tree are repeatable and `source_version` is well defined.
//!
//! ## Progress and Cancellation
//!
//! Progress goes to an optional observer as [`BatchEvent`]s; the batch itself
//! never prints. A [`CancellationToken`] is checked before each item, never
//! inside one, so cancellation cannot leave a half-written output file.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bmk_core::{detect_version, Document, Version};
use walkdir::WalkDir;

use crate::error::MigrationError;
use crate::migrator::{read_document, Migrator};
use crate::report::MigrationReport;

/// Progress notification emitted during a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchEvent {
    /// The collection was enumerated.
    Started {
        /// Input root.
        root: PathBuf,
        /// Number of items found.
        total: usize,
    },
    /// An item succeeded.
    ItemSucceeded {
        /// Path relative to the input root.
        path: PathBuf,
        /// Version the item was detected at.
        source_version: Version,
    },
    /// An item failed and was skipped.
    ItemFailed {
        /// Path relative to the input root.
        path: PathBuf,
        /// Why it failed.
        error: String,
    },
    /// The batch completed.
    Finished {
        /// Items attempted.
        processed: usize,
        /// Items that failed.
        failed: usize,
    },
}

/// Shared flag used to stop a batch between items.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Every clone observes it.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

type Observer = Box<dyn Fn(&BatchEvent) + Send + Sync>;

/// Migrates or inspects every document in a directory tree.
pub struct BatchMigrator {
    migrator: Migrator,
    observer: Option<Observer>,
    cancel: Option<CancellationToken>,
}

impl std::fmt::Debug for BatchMigrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchMigrator")
            .field("migrator", &self.migrator)
            .field("observer", &self.observer.is_some())
            .field("cancel", &self.cancel)
            .finish()
    }
}

impl BatchMigrator {
    /// Wrap a migrator.
    pub fn new(migrator: Migrator) -> Self {
        Self {
            migrator,
            observer: None,
            cancel: None,
        }
    }

    /// Receive a [`BatchEvent`] for every notable step.
    pub fn with_observer(mut self, observer: impl Fn(&BatchEvent) + Send + Sync + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Stop between items once `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The wrapped migrator.
    pub fn migrator(&self) -> &Migrator {
        &self.migrator
    }

    /// Migrate every item under `input_root` into the same relative path
    /// under `output_root`.
    ///
    /// # Errors
    ///
    /// [`MigrationError::Traversal`] if `input_root` cannot be read;
    /// [`MigrationError::Cancelled`] if the token fires. Item failures are
    /// only recorded in the returned report.
    pub fn migrate_directory(
        &self,
        input_root: &Path,
        output_root: &Path,
        target: &Version,
    ) -> Result<MigrationReport, MigrationError> {
        let items = collect_items(input_root)?;
        self.emit(BatchEvent::Started {
            root: input_root.to_path_buf(),
            total: items.len(),
        });

        let mut report = MigrationReport::new(*target);
        for item in items {
            self.check_cancelled(&report)?;
            let relative = match item {
                Item::File(relative) => relative,
                Item::Unreadable { relative, reason } => {
                    self.fail(&mut report, relative, reason);
                    continue;
                }
            };

            let doc = match read_document(&input_root.join(&relative)) {
                Ok(doc) => doc,
                Err(e) => {
                    self.fail(&mut report, relative, e.to_string());
                    continue;
                }
            };
            let source = match detect_version(&doc) {
                Ok(v) => v,
                Err(e) => {
                    self.fail(&mut report, relative, MigrationError::from(e).to_string());
                    continue;
                }
            };

            let output = output_root.join(&relative);
            match self.migrator.write_migrated(&doc, &output, target) {
                Ok(()) => self.succeed(&mut report, relative, source),
                Err(e) => {
                    report.observe_source(source);
                    self.fail(&mut report, relative, e.to_string());
                }
            }
        }

        self.finish(&report);
        Ok(report)
    }

    /// Dry run: check every item under `input_root` for a migration path to
    /// `target` without writing anything.
    ///
    /// Items already at `target` count as succeeded.
    ///
    /// # Errors
    ///
    /// Same as [`BatchMigrator::migrate_directory`].
    pub fn generate_report(
        &self,
        input_root: &Path,
        target: &Version,
    ) -> Result<MigrationReport, MigrationError> {
        let items = collect_items(input_root)?;
        self.emit(BatchEvent::Started {
            root: input_root.to_path_buf(),
            total: items.len(),
        });

        let mut report = MigrationReport::new(*target);
        for item in items {
            self.check_cancelled(&report)?;
            let relative = match item {
                Item::File(relative) => relative,
                Item::Unreadable { relative, reason } => {
                    self.fail(&mut report, relative, reason);
                    continue;
                }
            };

            let bytes = match std::fs::read(input_root.join(&relative)) {
                Ok(bytes) => bytes,
                Err(e) => {
                    self.fail(&mut report, relative, format!("unreadable: {e}"));
                    continue;
                }
            };
            let doc: Document = match serde_json::from_slice(&bytes) {
                Ok(doc) => doc,
                Err(e) => {
                    self.fail(&mut report, relative, format!("invalid JSON: {e}"));
                    continue;
                }
            };
            let source = match detect_version(&doc) {
                Ok(v) => v,
                Err(e) => {
                    self.fail(&mut report, relative, format!("invalid schema_version: {e}"));
                    continue;
                }
            };

            match self.migrator.registry().resolve_path(&source, target) {
                Ok(_) => self.succeed(&mut report, relative, source),
                Err(e) => {
                    report.observe_source(source);
                    self.fail(&mut report, relative, e.to_string());
                }
            }
        }

        self.finish(&report);
        Ok(report)
    }

    fn emit(&self, event: BatchEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    fn check_cancelled(&self, report: &MigrationReport) -> Result<(), MigrationError> {
        match &self.cancel {
            Some(token) if token.is_cancelled() => {
                tracing::info!(processed = report.files_processed, "batch cancelled");
                Err(MigrationError::Cancelled {
                    report: Box::new(report.clone()),
                })
            }
            _ => Ok(()),
        }
    }

    fn succeed(&self, report: &mut MigrationReport, relative: PathBuf, source: Version) {
        report.record_success(source);
        self.emit(BatchEvent::ItemSucceeded {
            path: relative,
            source_version: source,
        });
    }

    fn fail(&self, report: &mut MigrationReport, relative: PathBuf, reason: String) {
        tracing::warn!(path = %relative.display(), error = %reason, "skipping item");
        report.record_failure(format!("{}: {reason}", relative.display()));
        self.emit(BatchEvent::ItemFailed {
            path: relative,
            error: reason,
        });
    }

    fn finish(&self, report: &MigrationReport) {
        if report.is_mixed() {
            tracing::warn!(
                versions = ?report.source_versions,
                "batch contains documents at more than one source version"
            );
        }
        tracing::info!(
            processed = report.files_processed,
            succeeded = report.files_succeeded,
            failed = report.files_failed,
            "batch finished"
        );
        self.emit(BatchEvent::Finished {
            processed: report.files_processed,
            failed: report.files_failed,
        });
    }
}

/// One entry found while walking the input tree.
enum Item {
    /// A `*.json` file, relative to the root.
    File(PathBuf),
    /// A subtree that could not be read.
    Unreadable { relative: PathBuf, reason: String },
}

/// Enumerate `*.json` files beneath `root`, sorted by file name.
fn collect_items(root: &Path) -> Result<Vec<Item>, MigrationError> {
    std::fs::read_dir(root).map_err(|e| MigrationError::Traversal {
        path: root.display().to_string(),
        reason: e.to_string(),
    })?;

    let mut items = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        match entry {
            Ok(entry) => {
                let path = entry.path();
                if entry.file_type().is_file() && is_json(path) {
                    let relative = path.strip_prefix(root).unwrap_or(path).to_path_buf();
                    items.push(Item::File(relative));
                }
            }
            Err(e) => {
                let relative = e
                    .path()
                    .map(|p| p.strip_prefix(root).unwrap_or(p).to_path_buf())
                    .unwrap_or_default();
                items.push(Item::Unreadable {
                    relative,
                    reason: format!("unreadable: {e}"),
                });
            }
        }
    }
    Ok(items)
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
