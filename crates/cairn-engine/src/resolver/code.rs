//! Code migration registrations.
//!
//! Code migrations are explicit values the host registers with the engine
//! at construction time; the resolver merges them into the catalog next to
//! the script-based migrations.

use super::{MigrationExecutor, ResolvedMigration};
use crate::error::EngineResult;
use cairn_core::{MigrationKind, Version};
use duckdb::Connection;
use std::sync::Arc;

/// A programmatic migration supplied by the host.
pub trait CodeMigration: Send + Sync {
    /// The version this migration brings the schema to.
    fn version(&self) -> Version;

    /// Human-readable description recorded in the ledger.
    fn description(&self) -> String;

    /// Optional checksum used by validate to detect changes. Code
    /// migrations with no meaningful notion of content may return `None`,
    /// which exempts them from checksum validation.
    fn checksum(&self) -> Option<i32> {
        None
    }

    /// Identifier recorded in the ledger's `script` column.
    fn script(&self) -> String {
        std::any::type_name_of_val(self).to_string()
    }

    /// Apply the migration against the user-objects connection.
    fn migrate(&self, conn: &Connection) -> EngineResult<()>;
}

/// Wrap a registered code migration as a catalog entry.
pub(crate) fn resolve_code_migration(migration: &Arc<dyn CodeMigration>) -> ResolvedMigration {
    ResolvedMigration {
        version: migration.version(),
        description: migration.description(),
        kind: MigrationKind::Code,
        script: migration.script(),
        checksum: migration.checksum(),
        executor: MigrationExecutor::Code(Arc::clone(migration)),
    }
}
