//! # CLI Configuration
//!
//! Optional YAML file read from `--config <path>` or, failing that,
//! `bmk.yaml` at the project root. Every field has a default, so an absent
//! file and an empty file both mean "defaults". Command-line flags override
//! whatever the file says.
//!
//! ```yaml
//! schema_dir: schemas
//! target_version: 1.1.0
//! path_policy: shortest
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bmk_core::Version;
use bmk_migrate::PathPolicy;
use serde::{Deserialize, Serialize};

/// File name looked up at the project root.
pub const CONFIG_FILE_NAME: &str = "bmk.yaml";

/// Effective CLI settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Schema root, relative to the project root unless absolute.
    pub schema_dir: PathBuf,
    /// Default `--to` for `migrate` and `report`.
    pub target_version: Version,
    /// Default `--policy` for `migrate` and `report`.
    pub path_policy: PathPolicy,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            schema_dir: PathBuf::from("schemas"),
            target_version: Version::new(1, 1, 0),
            path_policy: PathPolicy::Direct,
        }
    }
}

impl CliConfig {
    /// Parse a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Load `explicit` if given, else `bmk.yaml` under `project_root` if it
    /// exists, else defaults.
    pub fn discover(explicit: Option<&Path>, project_root: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        let candidate = project_root.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            tracing::debug!(path = %candidate.display(), "using project config");
            Self::from_file(&candidate)
        } else {
            Ok(Self::default())
        }
    }

    /// `schema_dir` resolved against `project_root`.
    pub fn schema_dir(&self, project_root: &Path) -> PathBuf {
        if self.schema_dir.is_absolute() {
            self.schema_dir.clone()
        } else {
            project_root.join(&self.schema_dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CliConfig::default();
        assert_eq!(config.schema_dir, PathBuf::from("schemas"));
        assert_eq!(config.target_version, Version::new(1, 1, 0));
        assert_eq!(config.path_policy, PathPolicy::Direct);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmk.yaml");
        std::fs::write(&path, "path_policy: shortest\n").unwrap();
        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.path_policy, PathPolicy::Shortest);
        assert_eq!(config.target_version, Version::new(1, 1, 0));
    }

    #[test]
    fn test_full_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(
            &path,
            "schema_dir: /opt/schemas\ntarget_version: 1.0.0\npath_policy: direct\n",
        )
        .unwrap();
        let config = CliConfig::from_file(&path).unwrap();
        assert_eq!(config.target_version, Version::new(1, 0, 0));
        assert_eq!(
            config.schema_dir(Path::new("/project")),
            PathBuf::from("/opt/schemas")
        );
    }

    #[test]
    fn test_empty_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmk.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(CliConfig::from_file(&path).unwrap(), CliConfig::default());
    }

    #[test]
    fn test_bad_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmk.yaml");
        std::fs::write(&path, "target_version: latest\n").unwrap();
        assert!(CliConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmk.yaml");
        std::fs::write(&path, "schema_directory: x\n").unwrap();
        assert!(CliConfig::from_file(&path).is_err());
    }

    #[test]
    fn test_discover_prefers_explicit_then_project_file() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            CliConfig::discover(None, dir.path()).unwrap(),
            CliConfig::default()
        );

        std::fs::write(dir.path().join(CONFIG_FILE_NAME), "target_version: 1.0.0\n").unwrap();
        let found = CliConfig::discover(None, dir.path()).unwrap();
        assert_eq!(found.target_version, Version::new(1, 0, 0));

        let explicit = dir.path().join("other.yaml");
        std::fs::write(&explicit, "path_policy: shortest\n").unwrap();
        let chosen = CliConfig::discover(Some(&explicit), dir.path()).unwrap();
        assert_eq!(chosen.path_policy, PathPolicy::Shortest);
        assert_eq!(chosen.target_version, Version::new(1, 1, 0));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(CliConfig::discover(Some(&dir.path().join("nope.yaml")), dir.path()).is_err());
    }
}
