//! # bmk-schema — Benchmark Record Validation
//!
//! Validates benchmark records against the schema generation they claim to
//! follow.
//!
//! ## Validation (`validator`)
//!
//! A [`SchemaValidator`] compiles one generation's JSON Schema once and
//! checks any number of documents against it. Every structural violation is
//! collected into [`ValidationResult::errors`]; a mismatch between the
//! document's declared version and the schema's own version is reported as
//! a warning, never as an error. Malformed input yields an invalid result,
//! not an `Err`.
//!
//! ## Validator Cache (`manager`)
//!
//! [`SchemaManager`] owns a cache of compiled validators keyed by version,
//! loaded from `<base>/v<major>.<minor>/benchmark-result.json` on first use
//! and kept for the manager's lifetime. It also picks the validator for a
//! document whose version is not known ahead of time.
//!
//! ## Crate Policy
//!
//! - Depends only on `bmk-core` internally.
//! - Schema compilation never touches the network: external `$ref`s are
//!   rejected at load time.

pub mod error;
pub mod manager;
pub mod validator;

pub use error::SchemaError;
pub use manager::SchemaManager;
pub use validator::{schema_path, SchemaValidator, ValidationResult, SCHEMA_FILE_NAME};
