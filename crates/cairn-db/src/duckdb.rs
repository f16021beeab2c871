//! DuckDB backend implementation

use crate::error::{DbError, DbResult};
use crate::traits::{ConnectionProvider, DatabaseAdapter};
use duckdb::Connection;
use std::path::Path;

/// Extension trait for converting `duckdb::Error` into `DbResult`.
///
/// Reduces boilerplate when propagating database errors through the crate.
pub(crate) trait DuckDbResultExt<T> {
    fn to_db_err(self, context: &str) -> DbResult<T>;
}

impl<T> DuckDbResultExt<T> for Result<T, duckdb::Error> {
    fn to_db_err(self, context: &str) -> DbResult<T> {
        self.map_err(|e| DbError::ExecutionFailed {
            context: context.to_string(),
            source: e,
        })
    }
}

/// DuckDB database adapter.
///
/// DuckDB has no advisory locks and no `SELECT ... FOR UPDATE`;
/// [`DuckDbAdapter::lock_table`] registers a write intent with the
/// transaction manager instead, so a concurrent ledger writer in another
/// connection aborts at commit rather than interleaving. Cross-process
/// exclusion comes from DuckDB's own database file lock.
pub struct DuckDbAdapter;

impl DatabaseAdapter for DuckDbAdapter {
    fn db_type(&self) -> &'static str {
        "duckdb"
    }

    fn supports_ddl_transactions(&self) -> bool {
        true
    }

    fn statement_delimiter(&self) -> char {
        ';'
    }

    fn current_schema(&self, conn: &Connection) -> DbResult<String> {
        conn.query_row("SELECT current_schema()", [], |row| row.get(0))
            .to_db_err("current_schema()")
    }

    fn set_current_schema(&self, conn: &Connection, schema: &str) -> DbResult<()> {
        // USE wants the schema qualified by its database.
        let database: String = conn
            .query_row("SELECT current_database()", [], |row| row.get(0))
            .to_db_err("current_database()")?;
        conn.execute_batch(&format!("USE {database}.{schema}"))
            .to_db_err(&format!("set current schema to {schema}"))
    }

    fn schema_exists(&self, conn: &Connection, schema: &str) -> DbResult<bool> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.schemata WHERE schema_name = ?",
                [schema],
                |row| row.get(0),
            )
            .to_db_err(&format!("check schema {schema} exists"))?;
        Ok(count > 0)
    }

    fn create_schema(&self, conn: &Connection, schema: &str) -> DbResult<()> {
        conn.execute_batch(&format!("CREATE SCHEMA IF NOT EXISTS {schema}"))
            .to_db_err(&format!("create schema {schema}"))
    }

    fn schema_empty(&self, conn: &Connection, schema: &str) -> DbResult<bool> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = ?",
                [schema],
                |row| row.get(0),
            )
            .to_db_err(&format!("count objects in schema {schema}"))?;
        Ok(count == 0)
    }

    fn drop_schema_contents(&self, conn: &Connection, schema: &str) -> DbResult<()> {
        let mut stmt = conn
            .prepare(
                "SELECT table_name, table_type FROM information_schema.tables \
                 WHERE table_schema = ?",
            )
            .to_db_err(&format!("list objects in schema {schema}"))?;
        let objects: Vec<(String, String)> = stmt
            .query_map([schema], |row| Ok((row.get(0)?, row.get(1)?)))
            .to_db_err(&format!("list objects in schema {schema}"))?
            .collect::<Result<Vec<_>, _>>()
            .to_db_err(&format!("list objects in schema {schema}"))?;

        // Views first so dropped tables do not invalidate them mid-pass.
        for (name, table_type) in objects.iter().filter(|(_, t)| t == "VIEW") {
            log::debug!("Dropping {table_type} {schema}.{name}");
            conn.execute_batch(&format!("DROP VIEW IF EXISTS {schema}.{name} CASCADE"))
                .to_db_err(&format!("drop view {schema}.{name}"))?;
        }
        for (name, table_type) in objects.iter().filter(|(_, t)| t != "VIEW") {
            log::debug!("Dropping {table_type} {schema}.{name}");
            conn.execute_batch(&format!("DROP TABLE IF EXISTS {schema}.{name} CASCADE"))
                .to_db_err(&format!("drop table {schema}.{name}"))?;
        }
        Ok(())
    }

    fn drop_schema(&self, conn: &Connection, schema: &str) -> DbResult<()> {
        conn.execute_batch(&format!("DROP SCHEMA IF EXISTS {schema} CASCADE"))
            .to_db_err(&format!("drop schema {schema}"))
    }

    fn table_exists(&self, conn: &Connection, schema: &str, table: &str) -> DbResult<bool> {
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM information_schema.tables \
                 WHERE table_schema = ? AND table_name = ?",
                [schema, table],
                |row| row.get(0),
            )
            .to_db_err(&format!("check table {schema}.{table} exists"))?;
        Ok(count > 0)
    }

    fn lock_table(&self, conn: &Connection, schema: &str, table: &str) -> DbResult<()> {
        // No-match UPDATE: registers the table with the transaction manager
        // without changing a row.
        conn.execute(
            &format!("UPDATE {schema}.{table} SET version = version WHERE version IS NULL"),
            [],
        )
        .to_db_err(&format!("lock table {schema}.{table}"))?;
        Ok(())
    }

    fn current_user(&self, _conn: &Connection) -> DbResult<String> {
        // DuckDB has no database users; fall back to the OS user.
        Ok(std::env::var("USER")
            .or_else(|_| std::env::var("USERNAME"))
            .unwrap_or_else(|_| "unknown".to_string()))
    }
}

/// Connection provider backed by a single DuckDB database instance.
///
/// The database is opened once; [`ConnectionProvider::connection`] clones
/// additional connections from it, so an in-memory database is shared by
/// every connection the provider hands out.
pub struct DuckDbProvider {
    conn: Connection,
}

impl DuckDbProvider {
    /// Open an in-memory DuckDB database
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| DbError::ConnectionFailed {
            message: ":memory:".to_string(),
            source: e,
        })?;
        Ok(Self { conn })
    }

    /// Open (or create) a DuckDB database file
    pub fn from_path(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path).map_err(|e| DbError::ConnectionFailed {
            message: path.display().to_string(),
            source: e,
        })?;
        Ok(Self { conn })
    }

    /// Open from a path string (handles the :memory: special case)
    pub fn open(path: &str) -> DbResult<Self> {
        if path == ":memory:" {
            Self::in_memory()
        } else {
            Self::from_path(Path::new(path))
        }
    }
}

impl ConnectionProvider for DuckDbProvider {
    fn connection(&self) -> DbResult<Connection> {
        self.conn.try_clone().map_err(|e| DbError::ConnectionFailed {
            message: "clone connection".to_string(),
            source: e,
        })
    }
}

#[cfg(test)]
#[path = "duckdb_test.rs"]
mod tests;
