//! # Migrations Subcommand
//!
//! Lists the registered migrations in `(from, to)` order.

use anyhow::Result;
use bmk_core::Version;
use clap::Args;
use serde::Serialize;

use crate::CliContext;

/// Arguments for the `bmk migrations` subcommand.
#[derive(Args, Debug)]
pub struct MigrationsArgs {
    /// Print the list as JSON.
    #[arg(long)]
    pub json: bool,
}

/// One registered migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MigrationEntry {
    /// Source version.
    pub from: Version,
    /// Target version.
    pub to: Version,
    /// What the migration changes.
    pub description: String,
}

/// Execute the migrations subcommand.
pub fn run_migrations(args: &MigrationsArgs, ctx: &CliContext) -> Result<u8> {
    let entries = list_migrations(ctx);
    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for e in &entries {
            println!("{} -> {}: {}", e.from, e.to, e.description);
        }
        println!("{} migration(s) registered", entries.len());
    }
    Ok(0)
}

/// Registered migrations, sorted.
pub fn list_migrations(ctx: &CliContext) -> Vec<MigrationEntry> {
    ctx.registry(None)
        .list()
        .into_iter()
        .map(|m| MigrationEntry {
            from: m.from(),
            to: m.to(),
            description: m.description().to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CliConfig;

    #[test]
    fn test_lists_builtin() {
        let ctx = CliContext::new("/project", CliConfig::default());
        let entries = list_migrations(&ctx);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].from, Version::new(1, 0, 0));
        assert_eq!(entries[0].to, Version::new(1, 1, 0));
        assert_eq!(
            run_migrations(&MigrationsArgs { json: true }, &ctx).unwrap(),
            0
        );
    }
}
