//! # bmk-cli — Command-Line Interface for Benchmark Record Versioning
//!
//! Provides the `bmk` binary on top of `bmk-schema` and `bmk-migrate`.
//!
//! ## Subcommands
//!
//! - `bmk validate`: check a record or a directory of records against their
//!   schema generation.
//! - `bmk migrate`: upgrade a record or a directory tree to a target version.
//! - `bmk report`: dry run: which records could be migrated, printed as JSON.
//! - `bmk migrations`: list the registered migrations.
//!
//! ```bash
//! bmk validate results/ --json
//! bmk migrate results/ upgraded/ --to 1.1.0
//! bmk report results/
//! ```
//!
//! Every handler has the shape `run_x(&args, &ctx) -> anyhow::Result<u8>`
//! and returns the process exit code.

pub mod config;
pub mod migrate;
pub mod migrations;
pub mod report;
pub mod validate;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bmk_migrate::{MigrationRegistry, PathPolicy};
use walkdir::WalkDir;

use crate::config::CliConfig;

/// Resolved project root plus effective configuration, shared by every
/// subcommand.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Directory that relative input paths and `schema_dir` resolve against.
    pub project_root: PathBuf,
    /// Effective configuration.
    pub config: CliConfig,
}

impl CliContext {
    /// Bundle a project root with its configuration.
    pub fn new(project_root: impl Into<PathBuf>, config: CliConfig) -> Self {
        Self {
            project_root: project_root.into(),
            config,
        }
    }

    /// Absolute schema directory.
    pub fn schema_dir(&self) -> PathBuf {
        self.config.schema_dir(&self.project_root)
    }

    /// Built-in registry under `policy`, or the configured policy if `None`.
    pub fn registry(&self, policy: Option<PathPolicy>) -> Arc<MigrationRegistry> {
        let policy = policy.unwrap_or(self.config.path_policy);
        Arc::new(MigrationRegistry::with_builtin().with_policy(policy))
    }
}

/// Resolve a path that may be relative to the project root.
///
/// Absolute paths are returned as-is. A relative path that exists under
/// `project_root` resolves there; otherwise it stays relative to the
/// current directory.
pub fn resolve_path(path: &Path, project_root: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let project_relative = project_root.join(path);
    if project_relative.exists() {
        project_relative
    } else {
        path.to_path_buf()
    }
}

/// Walk up from `start` to the first directory containing `schemas/`.
pub fn resolve_project_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("schemas").is_dir() {
            return Some(dir.to_path_buf());
        }
        dir = dir.parent()?;
    }
}

/// One entry found while walking for records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonEntry {
    /// A `*.json` file (or a symlink named like one).
    File(PathBuf),
    /// A part of the tree that could not be read.
    Unreadable {
        /// Where the walk failed, or the root if unknown.
        path: PathBuf,
        /// Walk error message.
        reason: String,
    },
}

/// Every `*.json` entry beneath `root`, sorted by file name per directory.
///
/// Walk errors become [`JsonEntry::Unreadable`] entries and the walk goes on.
pub fn collect_json_files(root: &Path) -> Vec<JsonEntry> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                entries.push(JsonEntry::Unreadable {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        let is_json = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));
        let file_like = entry.file_type().is_file() || entry.path_is_symlink();
        if file_like && is_json {
            entries.push(JsonEntry::File(entry.into_path()));
        }
    }
    entries
}

/// `path` relative to `base` for display, or unchanged if not beneath it.
pub(crate) fn display_relative(path: &Path, base: &Path) -> String {
    path.strip_prefix(base)
        .ok()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_path_absolute_unchanged() {
        let p = Path::new("/abs/record.json");
        assert_eq!(resolve_path(p, Path::new("/elsewhere")), p);
    }

    #[test]
    fn test_resolve_path_prefers_project_relative() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("run.json"), "{}").unwrap();
        assert_eq!(
            resolve_path(Path::new("run.json"), root.path()),
            root.path().join("run.json")
        );
        assert_eq!(
            resolve_path(Path::new("missing.json"), root.path()),
            PathBuf::from("missing.json")
        );
    }

    #[test]
    fn test_resolve_project_root_walks_up() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("schemas")).unwrap();
        let nested = root.path().join("data/x86/2024");
        std::fs::create_dir_all(&nested).unwrap();
        assert_eq!(resolve_project_root(&nested), Some(root.path().to_path_buf()));
    }

    #[test]
    fn test_collect_json_files_sorted_and_filtered() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("b")).unwrap();
        std::fs::write(root.path().join("b/2.json"), "{}").unwrap();
        std::fs::write(root.path().join("a.json"), "{}").unwrap();
        std::fs::write(root.path().join("notes.md"), "").unwrap();

        let files = collect_json_files(root.path());
        assert_eq!(
            files,
            vec![
                JsonEntry::File(root.path().join("a.json")),
                JsonEntry::File(root.path().join("b/2.json"))
            ]
        );
    }

    #[test]
    fn test_context_registry_uses_configured_policy() {
        let config = CliConfig {
            path_policy: PathPolicy::Shortest,
            ..CliConfig::default()
        };
        let ctx = CliContext::new("/project", config);
        assert_eq!(ctx.registry(None).policy(), PathPolicy::Shortest);
        assert_eq!(
            ctx.registry(Some(PathPolicy::Direct)).policy(),
            PathPolicy::Direct
        );
        assert_eq!(ctx.schema_dir(), PathBuf::from("/project/schemas"));
    }
}
