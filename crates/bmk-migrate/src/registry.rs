//! # Migration Registry
//!
//! A keyed catalog of [`Migration`]s, at most one per `(from, to)` pair.
//! Registration order does not affect lookup; it only decides which of two
//! conflicting registrations is rejected.
//!
//! ## Path Resolution
//!
//! [`PathPolicy::Direct`] (the default) only follows a single registered
//! edge. [`PathPolicy::Shortest`] treats the registered migrations as a
//! directed graph over versions and returns the fewest-hop chain found by
//! breadth-first search. Neighbours are visited in version order, so the
//! chosen chain is deterministic.
//!
//! ## Concurrency
//!
//! Reads share a `parking_lot::RwLock`; `register` holds the write lock for
//! its check-and-insert so concurrent registrations cannot both succeed for
//! one pair.

use std::collections::{BTreeMap, HashMap, VecDeque};

use bmk_core::Version;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::builtin::builtin_migrations;
use crate::error::MigrationError;
use crate::migration::Migration;

/// How [`MigrationRegistry::resolve_path`] searches for a route.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PathPolicy {
    /// Only a single registered edge.
    #[default]
    Direct,
    /// Fewest-hop chain over all registered edges.
    Shortest,
}

impl std::fmt::Display for PathPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Direct => "direct",
            Self::Shortest => "shortest",
        })
    }
}

impl std::str::FromStr for PathPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "direct" => Ok(Self::Direct),
            "shortest" => Ok(Self::Shortest),
            other => Err(format!(
                "unknown path policy {other:?} (expected \"direct\" or \"shortest\")"
            )),
        }
    }
}

/// Catalog of migrations keyed by `(from, to)`.
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    entries: RwLock<BTreeMap<(Version, Version), Migration>>,
    policy: PathPolicy,
}

impl MigrationRegistry {
    /// An empty registry using [`PathPolicy::Direct`].
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the built-in migrations.
    pub fn with_builtin() -> Self {
        let registry = Self::new();
        for migration in builtin_migrations() {
            // Built-in keys are distinct, so registration cannot conflict.
            if let Err(e) = registry.register(migration) {
                tracing::error!(error = %e, "conflicting built-in migration skipped");
            }
        }
        registry
    }

    /// Replace the path policy.
    pub fn with_policy(mut self, policy: PathPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// The active path policy.
    pub fn policy(&self) -> PathPolicy {
        self.policy
    }

    /// Add a migration.
    ///
    /// # Errors
    ///
    /// [`MigrationError::DuplicateMigration`] if the pair is already taken.
    /// The existing entry is kept.
    pub fn register(&self, migration: Migration) -> Result<(), MigrationError> {
        let key = migration.key();
        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return Err(MigrationError::DuplicateMigration {
                from: key.0,
                to: key.1,
            });
        }
        tracing::debug!(from = %key.0, to = %key.1, "registered migration");
        entries.insert(key, migration);
        Ok(())
    }

    /// Exact single-hop lookup.
    pub fn lookup(&self, from: &Version, to: &Version) -> Result<Migration, MigrationError> {
        self.entries
            .read()
            .get(&(*from, *to))
            .cloned()
            .ok_or(MigrationError::NoMigrationPath {
                from: *from,
                to: *to,
            })
    }

    /// Ordered list of migrations leading from `from` to `to`.
    ///
    /// Equal versions resolve to an empty path under either policy.
    pub fn resolve_path(
        &self,
        from: &Version,
        to: &Version,
    ) -> Result<Vec<Migration>, MigrationError> {
        if from == to {
            return Ok(Vec::new());
        }
        match self.policy {
            PathPolicy::Direct => self.lookup(from, to).map(|m| vec![m]),
            PathPolicy::Shortest => self.shortest_path(from, to),
        }
    }

    fn shortest_path(&self, from: &Version, to: &Version) -> Result<Vec<Migration>, MigrationError> {
        let entries = self.entries.read();

        // BTreeMap iteration yields edges sorted by (from, to), so each
        // adjacency list is already in version order.
        let mut adjacency: HashMap<Version, Vec<Version>> = HashMap::new();
        for (src, dst) in entries.keys() {
            adjacency.entry(*src).or_default().push(*dst);
        }

        let mut previous: HashMap<Version, Version> = HashMap::new();
        let mut queue = VecDeque::from([*from]);
        while let Some(current) = queue.pop_front() {
            if current == *to {
                break;
            }
            for next in adjacency.get(&current).into_iter().flatten() {
                if *next != *from && !previous.contains_key(next) {
                    previous.insert(*next, current);
                    queue.push_back(*next);
                }
            }
        }

        if !previous.contains_key(to) {
            return Err(MigrationError::NoMigrationPath {
                from: *from,
                to: *to,
            });
        }

        let mut hops = Vec::new();
        let mut cursor = *to;
        while cursor != *from {
            let prior = previous[&cursor];
            hops.push(entries[&(prior, cursor)].clone());
            cursor = prior;
        }
        hops.reverse();
        Ok(hops)
    }

    /// All registered migrations, sorted by `(from, to)`.
    pub fn list(&self) -> Vec<Migration> {
        self.entries.read().values().cloned().collect()
    }

    /// Number of registered migrations.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
