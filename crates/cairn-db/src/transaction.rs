//! Transaction helper shared by every mutating ledger operation.

use crate::error::DbError;
use duckdb::Connection;

/// Execute `body` within a `BEGIN` / `COMMIT` transaction, rolling back on
/// error.
///
/// Generic over the caller's error type so engine code can run its own
/// result types through it; BEGIN/COMMIT failures surface as [`DbError`]
/// converted via `From`.
pub fn with_transaction<T, E, F>(conn: &Connection, body: F) -> Result<T, E>
where
    E: From<DbError>,
    F: FnOnce(&Connection) -> Result<T, E>,
{
    conn.execute_batch("BEGIN TRANSACTION")
        .map_err(|e| E::from(DbError::TransactionFailed(format!("BEGIN failed: {e}"))))?;

    let result = body(conn);

    match &result {
        Ok(_) => {
            if let Err(commit_err) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(E::from(DbError::TransactionFailed(format!(
                    "COMMIT failed: {commit_err}"
                ))));
            }
        }
        Err(_) => {
            let _ = conn.execute_batch("ROLLBACK");
        }
    }
    result
}

#[cfg(test)]
#[path = "transaction_test.rs"]
mod tests;
