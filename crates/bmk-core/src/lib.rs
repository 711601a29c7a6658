//! # bmk-core — Foundational Types for Benchmark Record Versioning
//!
//! Benchmark result records evolve through numbered schema generations.
//! This crate defines the primitives every other crate in the workspace
//! builds on; it depends on nothing internal.
//!
//! ## Key Types
//!
//! - [`Version`]: immutable `major.minor.patch` value with the
//!   same-major compatibility rule used by validation and migration.
//! - [`Document`]: a benchmark record as a JSON value.
//! - [`detect_version`]: the single version-detection rule, including the
//!   legacy `metadata.data_version` fallback. Both the validation path and
//!   the migration path call it so they can never disagree.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `bmk-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod version;

pub use document::{
    detect_version, detect_version_lenient, detect_version_with_source, json_type_name,
    set_schema_version, DetectedVersion, Document, VersionSource, LEGACY_DATA_VERSION,
    SCHEMA_VERSION_FIELD,
};
pub use error::VersionError;
pub use version::Version;
