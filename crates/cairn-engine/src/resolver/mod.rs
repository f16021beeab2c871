//! Migration discovery.
//!
//! The resolver turns the configured locations plus any registered code
//! migrations into the catalog: an ordered, duplicate-free list of
//! [`ResolvedMigration`]s. The catalog is rebuilt on every command and
//! discarded when the command ends.

pub mod code;
pub mod sql;

pub use code::CodeMigration;

use crate::error::{EngineError, EngineResult};
use cairn_core::{Config, MigrationKind, PlaceholderMap, Version};
use cairn_db::{split_statements, DatabaseAdapter};
use duckdb::Connection;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// How a resolved migration is applied to the user-objects connection.
pub enum MigrationExecutor {
    /// Read the script, substitute placeholders, split into statements, and
    /// run each against the connection.
    Sql {
        path: PathBuf,
        placeholders: PlaceholderMap,
    },
    /// Delegate to a registered code migration.
    Code(Arc<dyn CodeMigration>),
}

impl fmt::Debug for MigrationExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MigrationExecutor::Sql { path, .. } => {
                f.debug_struct("Sql").field("path", path).finish()
            }
            MigrationExecutor::Code(_) => f.debug_struct("Code").finish_non_exhaustive(),
        }
    }
}

/// An available migration produced by the resolver.
#[derive(Debug)]
pub struct ResolvedMigration {
    pub version: Version,
    pub description: String,
    pub kind: MigrationKind,
    /// File name for SQL migrations, type name for code migrations.
    pub script: String,
    /// Checksum of the raw normalized script; `None` for code migrations
    /// that do not provide one.
    pub checksum: Option<i32>,
    pub executor: MigrationExecutor,
}

impl ResolvedMigration {
    /// Apply this migration to `conn`.
    pub fn execute(&self, conn: &Connection, adapter: &dyn DatabaseAdapter) -> EngineResult<()> {
        match &self.executor {
            MigrationExecutor::Sql { path, placeholders } => {
                let raw = std::fs::read_to_string(path).map_err(|e| EngineError::Resolve {
                    script: self.script.clone(),
                    reason: e.to_string(),
                })?;
                let substituted = placeholders.substitute(&raw, &self.script)?;
                for statement in split_statements(&substituted, adapter.statement_delimiter()) {
                    log::debug!("Executing: {statement}");
                    conn.execute_batch(&statement)
                        .map_err(cairn_db::DbError::from)?;
                }
                Ok(())
            }
            MigrationExecutor::Code(migration) => migration.migrate(conn),
        }
    }
}

/// Resolve the full catalog: SQL migrations from the configured locations
/// merged with the registered code migrations, sorted ascending by version.
///
/// Fails if two migrations (of either kind) share a version.
pub fn resolve_migrations(
    config: &Config,
    code_migrations: &[Arc<dyn CodeMigration>],
) -> EngineResult<Vec<ResolvedMigration>> {
    let mut migrations = sql::resolve_sql_migrations(config)?;
    migrations.extend(code_migrations.iter().map(code::resolve_code_migration));

    migrations.sort_by(|a, b| a.version.cmp(&b.version));

    for pair in migrations.windows(2) {
        if pair[0].version == pair[1].version {
            return Err(EngineError::DuplicateVersion {
                version: pair[0].version.clone(),
                first: pair[0].script.clone(),
                second: pair[1].script.clone(),
            });
        }
    }

    log::debug!("Resolved {} migrations", migrations.len());
    Ok(migrations)
}

#[cfg(test)]
#[path = "resolver_test.rs"]
mod tests;
