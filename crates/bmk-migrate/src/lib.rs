//! # bmk-migrate — Benchmark Record Migration
//!
//! Upgrades benchmark records from one schema generation to another.
//!
//! ## Units and Registry (`migration`, `registry`, `builtin`)
//!
//! A [`Migration`] is a human-authored transformation between exactly two
//! versions. The [`MigrationRegistry`] keeps at most one per `(from, to)`
//! pair and resolves the sequence of steps from a document's version to a
//! target under a [`PathPolicy`].
//!
//! ## Single Documents (`migrator`)
//!
//! [`Migrator`] applies a resolved path fail-fast: the first failing step
//! aborts the call and nothing partial is returned or written.
//!
//! ## Collections (`batch`, `report`)
//!
//! [`BatchMigrator`] walks a directory of `*.json` records, isolates item
//! failures, and summarizes the run in a [`MigrationReport`]. It can also do
//! a dry run that only checks whether each item has a path to the target.
//!
//! ## Crate Policy
//!
//! - Depends only on `bmk-core` internally; schema validation is not a
//!   precondition of migration.
//! - Logs through `tracing`; never prints.

pub mod batch;
pub mod builtin;
pub mod error;
pub mod migration;
pub mod migrator;
pub mod registry;
pub mod report;

pub use batch::{BatchEvent, BatchMigrator, CancellationToken};
pub use builtin::builtin_migrations;
pub use error::MigrationError;
pub use migration::{Migration, MigrationStepError, TransformFn};
pub use migrator::{read_document, Migrator};
pub use registry::{MigrationRegistry, PathPolicy};
pub use report::MigrationReport;
