//! Tests for the DuckDB adapter and connection provider.

use super::{DuckDbAdapter, DuckDbProvider};
use crate::traits::{ConnectionProvider, DatabaseAdapter};
use duckdb::Connection;

fn adapter() -> DuckDbAdapter {
    DuckDbAdapter
}

fn conn() -> Connection {
    Connection::open_in_memory().unwrap()
}

// ── Capabilities ───────────────────────────────────────────────────────

#[test]
fn reports_capabilities() {
    let adapter = adapter();
    assert_eq!(adapter.db_type(), "duckdb");
    assert!(adapter.supports_ddl_transactions());
    assert_eq!(adapter.statement_delimiter(), ';');
}

// ── Schema operations ──────────────────────────────────────────────────

#[test]
fn current_schema_defaults_to_main() {
    let conn = conn();
    assert_eq!(adapter().current_schema(&conn).unwrap(), "main");
}

#[test]
fn set_current_schema_changes_default() {
    let conn = conn();
    let adapter = adapter();
    adapter.create_schema(&conn, "app").unwrap();
    adapter.set_current_schema(&conn, "app").unwrap();
    assert_eq!(adapter.current_schema(&conn).unwrap(), "app");
}

#[test]
fn schema_exists_and_create() {
    let conn = conn();
    let adapter = adapter();
    assert!(!adapter.schema_exists(&conn, "staging").unwrap());
    adapter.create_schema(&conn, "staging").unwrap();
    assert!(adapter.schema_exists(&conn, "staging").unwrap());
    // Idempotent.
    adapter.create_schema(&conn, "staging").unwrap();
}

#[test]
fn schema_empty_tracks_objects() {
    let conn = conn();
    let adapter = adapter();
    adapter.create_schema(&conn, "app").unwrap();
    assert!(adapter.schema_empty(&conn, "app").unwrap());

    conn.execute_batch("CREATE TABLE app.t (id INTEGER)").unwrap();
    assert!(!adapter.schema_empty(&conn, "app").unwrap());
}

#[test]
fn table_exists() {
    let conn = conn();
    let adapter = adapter();
    assert!(!adapter.table_exists(&conn, "main", "t").unwrap());
    conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
    assert!(adapter.table_exists(&conn, "main", "t").unwrap());
}

#[test]
fn drop_schema_contents_removes_tables_and_views() {
    let conn = conn();
    let adapter = adapter();
    adapter.create_schema(&conn, "app").unwrap();
    conn.execute_batch(
        "CREATE TABLE app.t (id INTEGER);
         CREATE VIEW app.v AS SELECT * FROM app.t;",
    )
    .unwrap();
    assert!(!adapter.schema_empty(&conn, "app").unwrap());

    adapter.drop_schema_contents(&conn, "app").unwrap();

    assert!(adapter.schema_empty(&conn, "app").unwrap());
    assert!(adapter.schema_exists(&conn, "app").unwrap());
}

#[test]
fn drop_schema_removes_the_schema() {
    let conn = conn();
    let adapter = adapter();
    adapter.create_schema(&conn, "gone").unwrap();
    conn.execute_batch("CREATE TABLE gone.t (id INTEGER)").unwrap();

    adapter.drop_schema(&conn, "gone").unwrap();

    assert!(!adapter.schema_exists(&conn, "gone").unwrap());
}

// ── Locking ────────────────────────────────────────────────────────────

#[test]
fn lock_table_inside_transaction() {
    let conn = conn();
    let adapter = adapter();
    conn.execute_batch("CREATE TABLE schema_version (version VARCHAR PRIMARY KEY)")
        .unwrap();

    conn.execute_batch("BEGIN TRANSACTION").unwrap();
    adapter.lock_table(&conn, "main", "schema_version").unwrap();
    conn.execute_batch("COMMIT").unwrap();
}

#[test]
fn current_user_is_nonempty() {
    let conn = conn();
    assert!(!adapter().current_user(&conn).unwrap().is_empty());
}

// ── Connection provider ────────────────────────────────────────────────

#[test]
fn provider_connections_share_the_database() {
    let provider = DuckDbProvider::in_memory().unwrap();
    let a = provider.connection().unwrap();
    let b = provider.connection().unwrap();

    a.execute_batch("CREATE TABLE shared (id INTEGER); INSERT INTO shared VALUES (1);")
        .unwrap();

    let count: i64 = b
        .query_row("SELECT COUNT(*) FROM shared", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn provider_opens_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cairn.duckdb");
    let provider = DuckDbProvider::open(path.to_str().unwrap()).unwrap();
    let conn = provider.connection().unwrap();
    conn.execute_batch("CREATE TABLE t (id INTEGER)").unwrap();
    assert!(path.exists());
}

#[test]
fn provider_handles_memory_path() {
    let provider = DuckDbProvider::open(":memory:").unwrap();
    provider.connection().unwrap();
}
