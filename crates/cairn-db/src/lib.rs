//! cairn-db - Database backends for Cairn
//!
//! Defines the [`DatabaseAdapter`] trait the engine programs against, the
//! [`ConnectionProvider`] that hands out connections, and the DuckDB
//! implementations of both.

pub mod duckdb;
pub mod error;
pub mod script;
pub mod traits;
pub mod transaction;

pub use crate::duckdb::{DuckDbAdapter, DuckDbProvider};
pub use error::{DbError, DbResult};
pub use script::split_statements;
pub use traits::{adapter_for, ConnectionProvider, DatabaseAdapter};
pub use transaction::with_transaction;
