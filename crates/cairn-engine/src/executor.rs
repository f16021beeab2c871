//! Migration application.
//!
//! The executor computes the pending set against the ledger, enforces the
//! ordering policy, and applies each pending migration on the user-objects
//! connection while recording outcomes on the ledger connection. The two
//! connections never share a transaction: user DDL is committed or rolled
//! back before the ledger row is written.

use crate::error::{EngineError, EngineResult};
use crate::metadata::MetadataTable;
use crate::resolver::ResolvedMigration;
use cairn_core::{AppliedMigration, Version};
use cairn_db::{with_transaction, DatabaseAdapter};
use duckdb::Connection;
use std::time::Instant;

/// Applies pending migrations for one migrate command.
pub struct Executor<'a> {
    metadata: &'a MetadataTable<'a>,
    user_conn: &'a Connection,
    adapter: &'a dyn DatabaseAdapter,
    target: Version,
    out_of_order: bool,
    ignore_failed_future: bool,
}

impl<'a> Executor<'a> {
    pub fn new(
        metadata: &'a MetadataTable<'a>,
        user_conn: &'a Connection,
        adapter: &'a dyn DatabaseAdapter,
        target: Version,
        out_of_order: bool,
        ignore_failed_future: bool,
    ) -> Self {
        Self {
            metadata,
            user_conn,
            adapter,
            target,
            out_of_order,
            ignore_failed_future,
        }
    }

    /// Apply every pending migration in version order.
    ///
    /// Returns the number of successfully applied migrations. A failing
    /// migration is recorded in the ledger and halts the run; the
    /// remaining pending migrations are not attempted.
    pub fn migrate(&self, catalog: &[ResolvedMigration]) -> EngineResult<usize> {
        let applied = self.metadata.all_applied()?;

        let max_available = catalog
            .last()
            .map(|m| m.version.clone())
            .unwrap_or(Version::Empty);

        // A failed row below the catalog ceiling blocks everything until
        // repair; a failed row above it is a failed future migration.
        for row in applied.iter().filter(|row| !row.success) {
            if row.version > max_available {
                if self.ignore_failed_future {
                    log::warn!(
                        "Ignoring failed future migration at version {} ({})",
                        row.version,
                        row.script
                    );
                    return Ok(0);
                }
                return Err(EngineError::FailedFuture {
                    version: row.version.clone(),
                });
            }
            return Err(EngineError::MigrationFailed {
                version: row.version.clone(),
                script: row.script.clone(),
                reason: "a previous attempt failed; run repair before migrating".to_string(),
            });
        }

        let pending = self.pending(catalog, &applied);
        if pending.is_empty() {
            log::info!("Schema is up to date; no migration necessary");
            return Ok(0);
        }

        let mut count = 0;
        for migration in pending {
            log::info!(
                "Migrating schema {} to version {} - {}",
                self.adapter.db_type(),
                migration.version,
                migration.description
            );

            let start = Instant::now();
            let result = if self.adapter.supports_ddl_transactions() {
                with_transaction(self.user_conn, |conn| migration.execute(conn, self.adapter))
            } else {
                migration.execute(self.user_conn, self.adapter)
            };
            let execution_time_ms = start.elapsed().as_millis() as i64;

            match result {
                Ok(()) => {
                    self.metadata.add_applied(migration, execution_time_ms, true)?;
                    count += 1;
                }
                Err(e) => {
                    self.metadata.add_applied(migration, execution_time_ms, false)?;
                    if self.adapter.supports_ddl_transactions() {
                        log::error!(
                            "Migration {} failed; changes rolled back",
                            migration.script
                        );
                    } else {
                        log::error!(
                            "Migration {} failed; DDL is not transactional here, manual cleanup \
                             may be required",
                            migration.script
                        );
                    }
                    return Err(EngineError::MigrationFailed {
                        version: migration.version.clone(),
                        script: migration.script.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        log::info!("Successfully applied {count} migrations");
        Ok(count)
    }

    /// The pending set: available migrations at or below the target that
    /// have not been applied, honoring the out-of-order policy.
    fn pending<'c>(
        &self,
        catalog: &'c [ResolvedMigration],
        applied: &[AppliedMigration],
    ) -> Vec<&'c ResolvedMigration> {
        let head = applied
            .iter()
            .filter(|row| row.success)
            .map(|row| row.version.clone())
            .max()
            .unwrap_or(Version::Empty);

        let mut pending = Vec::new();
        for migration in catalog {
            if migration.version > self.target {
                continue;
            }
            if applied
                .iter()
                .any(|row| row.success && row.version == migration.version)
            {
                continue;
            }
            if migration.version < head && !self.out_of_order {
                log::warn!(
                    "Ignoring out-of-order migration {} (current head is {head})",
                    migration.script
                );
                continue;
            }
            pending.push(migration);
        }
        // Catalog order is version order, which the filter preserves.
        pending
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
