//! # Error Types
//!
//! Errors raised by the core primitives. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations; higher crates wrap
//! them with `#[from]`.

use thiserror::Error;

/// Error parsing a version string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    /// The input is not exactly three dot-separated non-negative integers.
    #[error("malformed version {input:?}: {reason}")]
    Malformed {
        /// The rejected input, verbatim.
        input: String,
        /// Which part of the `major.minor.patch` pattern it violated.
        reason: String,
    },

    /// The document carries a `schema_version` that is not a string.
    #[error("schema_version must be a string, found {found}")]
    NotAString {
        /// JSON type name of the value that was found.
        found: &'static str,
    },
}
