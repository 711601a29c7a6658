//! # Schema Version
//!
//! Defines `Version`, the three-part ordinal identifying a schema
//! generation of the benchmark record format.
//!
//! ## Canonical Form
//!
//! A version is written `major.minor.patch`: exactly three runs of ASCII
//! digits joined by dots. No sign, no whitespace, no pre-release or build
//! suffix. [`Version::parse`] rejects anything else, and
//! `Version::parse(&v.to_string()) == Ok(v)` holds for every version.
//!
//! ## Compatibility
//!
//! `a.is_compatible_with(&r)` means "a satisfies at least the guarantees of
//! r". It holds only inside one major generation and only when `a` is at or
//! above `r`. A major bump is a breaking change, so compatibility never
//! crosses majors.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::VersionError;

/// A schema generation identifier: `major.minor.patch`.
///
/// The derived ordering is lexicographic over `(major, minor, patch)`. It is
/// used to pick the latest generation and to list versions deterministically;
/// it is *not* the compatibility relation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    /// Breaking-change counter.
    pub major: u32,
    /// Additive-change counter within a major generation.
    pub minor: u32,
    /// Fix counter within a minor generation.
    pub patch: u32,
}

impl Version {
    /// The version assumed for documents that declare none: `1.0.0`.
    pub const DEFAULT: Version = Version::new(1, 0, 0);

    /// Construct a version from its components.
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse the canonical `major.minor.patch` form.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError::Malformed`] unless the input is exactly three
    /// dot-separated runs of ASCII digits, each fitting in a `u32`.
    pub fn parse(s: &str) -> Result<Self, VersionError> {
        let malformed = |reason: String| VersionError::Malformed {
            input: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() != 3 {
            return Err(malformed(format!(
                "expected 3 dot-separated components, found {}",
                parts.len()
            )));
        }

        let mut components = [0u32; 3];
        for (slot, (part, name)) in components
            .iter_mut()
            .zip(parts.iter().zip(["major", "minor", "patch"]))
        {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(malformed(format!("{name} component is not an integer")));
            }
            *slot = part
                .parse()
                .map_err(|_| malformed(format!("{name} component is out of range")))?;
        }

        Ok(Self::new(components[0], components[1], components[2]))
    }

    /// Whether this version satisfies a `required` version.
    ///
    /// True iff both share a major version and this version's
    /// `(minor, patch)` is at or above the required one.
    pub fn is_compatible_with(&self, required: &Version) -> bool {
        self.major == required.major
            && (self.minor > required.minor
                || (self.minor == required.minor && self.patch >= required.patch))
    }

    /// The `major.minor` generation label, used for schema directory names.
    pub fn generation(&self) -> String {
        format!("{}.{}", self.major, self.minor)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Version> for String {
    fn from(v: Version) -> Self {
        v.to_string()
    }
}
