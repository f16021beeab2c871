//! Error types for cairn-db

use thiserror::Error;

/// Database operation errors
#[derive(Error, Debug)]
pub enum DbError {
    /// Connection error with preserved source chain (D001)
    #[error("[D001] Database connection failed: {message}")]
    ConnectionFailed {
        message: String,
        #[source]
        source: duckdb::Error,
    },

    /// Query execution error with preserved source chain (D002)
    #[error("[D002] SQL execution failed: {context}")]
    ExecutionFailed {
        context: String,
        #[source]
        source: duckdb::Error,
    },

    /// DuckDB driver error with preserved source chain (D002)
    #[error("[D002] SQL execution failed")]
    DuckDb(#[source] duckdb::Error),

    /// Transaction management error (D003)
    #[error("[D003] Transaction failed: {0}")]
    TransactionFailed(String),
}

impl From<duckdb::Error> for DbError {
    fn from(err: duckdb::Error) -> Self {
        DbError::DuckDb(err)
    }
}

/// Result type alias for DbError
pub type DbResult<T> = Result<T, DbError>;
