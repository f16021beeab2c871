//! The on-database ledger of applied migrations.
//!
//! [`MetadataTable`] owns all reads and writes of the `schema_version`
//! table. Every mutating operation runs inside its own transaction and
//! takes the ledger lock as its first statement, so two engine processes
//! pointed at the same database serialize on the table.

use crate::error::{EngineError, EngineResult};
use crate::resolver::ResolvedMigration;
use cairn_core::{AppliedMigration, MigrationKind, Version};
use cairn_db::{with_transaction, DatabaseAdapter, DbError};
use chrono::{DateTime, NaiveDateTime, Utc};
use duckdb::Connection;

/// The ledger table for one target schema.
pub struct MetadataTable<'a> {
    conn: &'a Connection,
    adapter: &'a dyn DatabaseAdapter,
    schema: String,
    table: String,
}

/// Map a driver error into the ledger error kind, with context.
fn ledger_err<T>(result: Result<T, duckdb::Error>, context: &str) -> EngineResult<T> {
    result.map_err(|e| EngineError::Ledger {
        context: context.to_string(),
        source: DbError::from(e),
    })
}

impl<'a> MetadataTable<'a> {
    pub fn new(
        conn: &'a Connection,
        adapter: &'a dyn DatabaseAdapter,
        schema: &str,
        table: &str,
    ) -> Self {
        Self {
            conn,
            adapter,
            schema: schema.to_string(),
            table: table.to_string(),
        }
    }

    /// Schema-qualified table name for SQL text.
    fn qualified(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    /// Whether the ledger table exists.
    pub fn exists(&self) -> EngineResult<bool> {
        self.adapter
            .table_exists(self.conn, &self.schema, &self.table)
            .map_err(EngineError::ledger("check ledger table exists"))
    }

    /// Create the ledger table if it is not already there. Idempotent.
    pub fn create_if_not_exists(&self) -> EngineResult<()> {
        if self.exists()? {
            return Ok(());
        }
        log::info!("Creating ledger table {}", self.qualified());

        let q = self.qualified();
        ledger_err(
            self.conn.execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {q} (
                     version_rank INTEGER NOT NULL,
                     installed_rank BIGINT NOT NULL,
                     version VARCHAR NOT NULL PRIMARY KEY,
                     description VARCHAR NOT NULL,
                     \"type\" VARCHAR NOT NULL,
                     script VARCHAR NOT NULL,
                     checksum INTEGER,
                     installed_by VARCHAR NOT NULL,
                     installed_on TIMESTAMP NOT NULL DEFAULT now(),
                     execution_time BIGINT NOT NULL,
                     success BOOLEAN NOT NULL,
                     \"current\" BOOLEAN NOT NULL DEFAULT FALSE
                 );
                 CREATE INDEX {table}_ir_idx ON {q} (installed_rank);",
                table = self.table,
            )),
            "create ledger table",
        )
    }

    /// Take the ledger lock. Must run inside a transaction; released when
    /// that transaction ends.
    pub fn lock(&self) -> EngineResult<()> {
        self.adapter
            .lock_table(self.conn, &self.schema, &self.table)
            .map_err(EngineError::ledger("lock ledger table"))
    }

    /// All ledger rows, ordered by `installed_rank`.
    pub fn all_applied(&self) -> EngineResult<Vec<AppliedMigration>> {
        let sql = format!(
            "SELECT installed_rank, version, description, \"type\", script, checksum, \
                    installed_by, CAST(installed_on AS VARCHAR), execution_time, success, \
                    \"current\" \
             FROM {} ORDER BY installed_rank",
            self.qualified()
        );
        let mut stmt = ledger_err(self.conn.prepare(&sql), "read ledger")?;

        type RawRow = (
            i64,
            String,
            String,
            String,
            String,
            Option<i32>,
            String,
            String,
            i64,
            bool,
            bool,
        );
        let raw: Vec<RawRow> = ledger_err(
            stmt.query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                    row.get(9)?,
                    row.get(10)?,
                ))
            })
            .and_then(|rows| rows.collect()),
            "read ledger",
        )?;

        let mut applied = Vec::with_capacity(raw.len());
        for (rank, version, description, kind, script, checksum, by, on, time, success, current) in
            raw
        {
            applied.push(AppliedMigration {
                installed_rank: rank,
                version: Version::parse(&version)?,
                description,
                kind: kind.parse::<MigrationKind>()?,
                script,
                checksum,
                installed_by: by,
                installed_on: parse_installed_on(&on)?,
                execution_time_ms: time,
                success,
                current,
            });
        }
        Ok(applied)
    }

    /// Record one application attempt of a resolved migration.
    pub fn add_applied(
        &self,
        migration: &ResolvedMigration,
        execution_time_ms: i64,
        success: bool,
    ) -> EngineResult<()> {
        with_transaction(self.conn, |_| {
            self.lock()?;
            self.insert_row(
                &migration.version,
                &migration.description,
                migration.kind,
                &migration.script,
                migration.checksum,
                execution_time_ms,
                success,
            )
        })
    }

    /// Record a baseline: a synthetic INIT row at `version`.
    ///
    /// Fails with UnexpectedState when the ledger already holds anything
    /// other than schema-creation markers.
    pub fn init(&self, version: &Version, description: &str) -> EngineResult<()> {
        self.create_if_not_exists()?;
        with_transaction(self.conn, |_| {
            self.lock()?;
            let occupied: i64 = ledger_err(
                self.conn.query_row(
                    &format!(
                        "SELECT COUNT(*) FROM {} WHERE \"type\" <> 'SCHEMA'",
                        self.qualified()
                    ),
                    [],
                    |row| row.get(0),
                ),
                "count ledger rows",
            )?;
            if occupied > 0 {
                return Err(EngineError::UnexpectedState(format!(
                    "Cannot init ledger {}: it already contains migrations",
                    self.qualified()
                )));
            }
            log::info!("Initializing ledger at version {version} - {description}");
            self.insert_row(
                version,
                description,
                MigrationKind::Init,
                description,
                None,
                0,
                true,
            )
        })
    }

    /// Record that the engine itself created the managed schemas.
    ///
    /// The marker authorizes `clean` to drop the schemas, not just their
    /// contents. Stored at version 0 so it sorts below any real migration.
    pub fn schemas_created(&self, schemas: &[String]) -> EngineResult<()> {
        self.create_if_not_exists()?;
        let description = format!("<< Created schemas: {} >>", schemas.join(", "));
        with_transaction(self.conn, |_| {
            self.lock()?;
            self.insert_row(
                &Version::parse("0")?,
                &description,
                MigrationKind::Schema,
                &description,
                None,
                0,
                true,
            )
        })
    }

    /// Restore ledger invariants after a failed migration: failed rows are
    /// removed, surviving checksums are aligned with the catalog, and the
    /// `current` flag is re-established.
    pub fn repair(&self, catalog: &[ResolvedMigration]) -> EngineResult<()> {
        with_transaction(self.conn, |_| {
            self.lock()?;
            let q = self.qualified();

            let mut stmt = ledger_err(
                self.conn.prepare(&format!(
                    "SELECT version, \"type\", checksum, success FROM {q}"
                )),
                "read ledger",
            )?;
            let rows: Vec<(String, String, Option<i32>, bool)> = ledger_err(
                stmt.query_map([], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?))
                })
                .and_then(|rows| rows.collect()),
                "read ledger",
            )?;

            for (version, _, _, _) in rows.iter().filter(|(_, _, _, success)| !success) {
                log::info!("Removing failed migration {version} from ledger");
                ledger_err(
                    self.conn
                        .execute(&format!("DELETE FROM {q} WHERE version = ?"), [version]),
                    "delete failed ledger row",
                )?;
            }

            for (version, kind, checksum, _) in rows.iter().filter(|(_, _, _, success)| *success) {
                let kind: MigrationKind = kind.parse()?;
                if kind.is_synthetic() {
                    continue;
                }
                let parsed = Version::parse(version)?;
                let Some(resolved) = catalog.iter().find(|m| m.version == parsed) else {
                    continue;
                };
                if resolved.checksum != *checksum {
                    log::info!(
                        "Repairing checksum of migration {version} ({:?} -> {:?})",
                        checksum,
                        resolved.checksum
                    );
                    self.set_checksum(version, resolved.checksum)?;
                }
            }

            self.refresh_current(None)
        })
    }

    /// Overwrite the stored checksum of one ledger row.
    pub fn update_checksum(&self, version: &Version, checksum: Option<i32>) -> EngineResult<()> {
        with_transaction(self.conn, |_| {
            self.lock()?;
            self.set_checksum(&version.to_string(), checksum)
        })
    }

    fn set_checksum(&self, version: &str, checksum: Option<i32>) -> EngineResult<()> {
        ledger_err(
            self.conn.execute(
                &format!("UPDATE {} SET checksum = ? WHERE version = ?", self.qualified()),
                duckdb::params![checksum, version],
            ),
            "update ledger checksum",
        )?;
        Ok(())
    }

    /// Insert one ledger row. Assumes the caller holds the lock inside an
    /// open transaction.
    #[allow(clippy::too_many_arguments)]
    fn insert_row(
        &self,
        version: &Version,
        description: &str,
        kind: MigrationKind,
        script: &str,
        checksum: Option<i32>,
        execution_time_ms: i64,
        success: bool,
    ) -> EngineResult<()> {
        let q = self.qualified();

        // Keep version_rank a dense version-ordered sequence: everything at
        // or above the new version shifts up one slot.
        let existing: Vec<String> = {
            let mut stmt =
                ledger_err(self.conn.prepare(&format!("SELECT version FROM {q}")), "read ledger")?;
            ledger_err(
                stmt.query_map([], |row| row.get(0)).and_then(|rows| rows.collect()),
                "read ledger",
            )?
        };
        let mut below = 0i64;
        for stored in &existing {
            if Version::parse(stored)? < *version {
                below += 1;
            }
        }
        let version_rank = below + 1;
        ledger_err(
            self.conn.execute(
                &format!("UPDATE {q} SET version_rank = version_rank + 1 WHERE version_rank >= ?"),
                [version_rank],
            ),
            "shift version ranks",
        )?;

        let installed_rank: i64 = ledger_err(
            self.conn.query_row(
                &format!("SELECT COALESCE(MAX(installed_rank), 0) + 1 FROM {q}"),
                [],
                |row| row.get(0),
            ),
            "compute installed rank",
        )?;

        ledger_err(
            self.conn.execute(
                &format!(
                    "INSERT INTO {q} (version_rank, installed_rank, version, description, \
                     \"type\", script, checksum, installed_by, execution_time, success, \
                     \"current\") \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, FALSE)"
                ),
                duckdb::params![
                    version_rank,
                    installed_rank,
                    version.to_string(),
                    description,
                    kind.to_string(),
                    script,
                    checksum,
                    self.adapter
                        .current_user(self.conn)
                        .map_err(EngineError::ledger("look up current user"))?,
                    execution_time_ms,
                    success,
                ],
            ),
            "insert ledger row",
        )?;

        self.refresh_current(Some(&version.to_string()))
    }

    /// Re-establish the single-`current` invariant: `current` is true on
    /// the max-versioned successful row, or on `fallback` when no row has
    /// succeeded yet.
    fn refresh_current(&self, fallback: Option<&str>) -> EngineResult<()> {
        let q = self.qualified();
        let mut stmt = ledger_err(
            self.conn
                .prepare(&format!("SELECT version, success FROM {q}")),
            "read ledger",
        )?;
        let rows: Vec<(String, bool)> = ledger_err(
            stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
                .and_then(|rows| rows.collect()),
            "read ledger",
        )?;

        let mut head: Option<(Version, String)> = None;
        for (stored, success) in rows {
            if !success {
                continue;
            }
            let parsed = Version::parse(&stored)?;
            if head.as_ref().is_none_or(|(best, _)| parsed > *best) {
                head = Some((parsed, stored));
            }
        }
        let target = head.map(|(_, s)| s).or_else(|| fallback.map(str::to_string));

        ledger_err(
            self.conn
                .execute(&format!("UPDATE {q} SET \"current\" = FALSE"), []),
            "clear current flag",
        )?;
        if let Some(version) = target {
            ledger_err(
                self.conn.execute(
                    &format!("UPDATE {q} SET \"current\" = TRUE WHERE version = ?"),
                    [version],
                ),
                "set current flag",
            )?;
        }
        Ok(())
    }
}

/// Parse the `installed_on` column as rendered by the database.
fn parse_installed_on(s: &str) -> EngineResult<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .map(|naive| DateTime::from_naive_utc_and_offset(naive, Utc))
        .map_err(|e| EngineError::UnexpectedState(format!("unparseable installed_on '{s}': {e}")))
}

#[cfg(test)]
#[path = "metadata_test.rs"]
mod tests;
