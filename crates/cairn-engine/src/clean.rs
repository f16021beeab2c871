//! Dropping user objects from the managed schemas.
//!
//! The object-dropping primitive belongs to the database adapter; this
//! module only sequences it across the configured schemas.

use crate::error::{EngineError, EngineResult};
use cairn_db::DatabaseAdapter;
use duckdb::Connection;

/// Clean the managed schemas, in reverse configuration order.
///
/// With `drop_schemas` the schemas themselves are dropped (allowed only
/// when the ledger records that the engine created them); otherwise each
/// schema is kept and emptied.
pub fn clean_schemas(
    conn: &Connection,
    adapter: &dyn DatabaseAdapter,
    schemas: &[String],
    drop_schemas: bool,
) -> EngineResult<()> {
    for schema in schemas.iter().rev() {
        if drop_schemas {
            log::info!("Dropping schema {schema}");
            adapter
                .drop_schema(conn, schema)
                .map_err(EngineError::from)?;
        } else {
            log::info!("Cleaning schema {schema}");
            adapter
                .drop_schema_contents(conn, schema)
                .map_err(EngineError::from)?;
        }
    }
    Ok(())
}
