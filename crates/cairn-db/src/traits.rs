//! Database adapter trait definition

use crate::duckdb::DuckDbAdapter;
use crate::error::DbResult;
use cairn_core::config::DbType;
use duckdb::Connection;

/// Vendor-specific database operations consumed by the engine.
///
/// Methods take the connection explicitly so a single adapter serves both
/// of a command's connections (ledger and user objects).
pub trait DatabaseAdapter {
    /// Database type identifier for logging
    fn db_type(&self) -> &'static str;

    /// Whether DDL statements participate in transactions
    fn supports_ddl_transactions(&self) -> bool;

    /// The delimiter used to split a migration script into statements
    fn statement_delimiter(&self) -> char;

    /// The connection's current default schema
    fn current_schema(&self, conn: &Connection) -> DbResult<String>;

    /// Change the connection's current default schema
    fn set_current_schema(&self, conn: &Connection, schema: &str) -> DbResult<()>;

    /// Check whether a schema exists
    fn schema_exists(&self, conn: &Connection, schema: &str) -> DbResult<bool>;

    /// Create a schema if it does not exist
    fn create_schema(&self, conn: &Connection, schema: &str) -> DbResult<()>;

    /// Whether a schema contains no tables or views
    fn schema_empty(&self, conn: &Connection, schema: &str) -> DbResult<bool>;

    /// Drop every table and view in a schema, keeping the schema itself
    fn drop_schema_contents(&self, conn: &Connection, schema: &str) -> DbResult<()>;

    /// Drop a schema and everything in it
    fn drop_schema(&self, conn: &Connection, schema: &str) -> DbResult<()>;

    /// Check whether a table exists in a schema
    fn table_exists(&self, conn: &Connection, schema: &str, table: &str) -> DbResult<bool>;

    /// Take an exclusive lock on a table for the rest of the enclosing
    /// transaction. Must be called inside a transaction.
    fn lock_table(&self, conn: &Connection, schema: &str, table: &str) -> DbResult<()>;

    /// The user name recorded in the ledger's `installed_by` column
    fn current_user(&self, conn: &Connection) -> DbResult<String>;
}

/// Build the adapter for a configured database type.
pub fn adapter_for(db_type: DbType) -> Box<dyn DatabaseAdapter> {
    match db_type {
        DbType::DuckDb => Box::new(DuckDbAdapter),
    }
}

/// Source of database connections.
///
/// Every engine command takes exactly two connections from the provider:
/// one for the ledger, one for user objects. The two must address the same
/// database but must never share a transaction.
pub trait ConnectionProvider {
    /// Open a new connection to the database
    fn connection(&self) -> DbResult<Connection>;
}
