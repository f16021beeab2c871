//! Error types for cairn-engine

use cairn_core::{CoreError, Version};
use cairn_db::DbError;
use thiserror::Error;

/// Engine error type for Cairn
///
/// Every command surfaces failures as one of these; core and database
/// causes are wrapped with their chains preserved.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Core error (configuration, version parsing, placeholders)
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Database error outside the ledger
    #[error(transparent)]
    Db(#[from] DbError),

    /// G001: candidate migration cannot be parsed or read
    #[error("[G001] Failed to resolve migration {script}: {reason}")]
    Resolve { script: String, reason: String },

    /// G002: two resolved migrations share a version
    #[error("[G002] Found more than one migration with version {version}: {first} and {second}")]
    DuplicateVersion {
        version: Version,
        first: String,
        second: String,
    },

    /// G003: ledger cannot be read, written, or locked
    #[error("[G003] Ledger unavailable: {context}")]
    Ledger {
        context: String,
        #[source]
        source: DbError,
    },

    /// G004: a command was invoked against a database in a state it cannot
    /// handle (init on a non-empty ledger, migrate without a ledger, ...)
    #[error("[G004] Unexpected state: {0}")]
    UnexpectedState(String),

    /// G005: applied migrations disagree with the available ones
    #[error("[G005] Validation failed: {0}")]
    ValidationFailed(String),

    /// G006: a migration raised during application
    #[error("[G006] Migration {script} (version {version}) failed: {reason}")]
    MigrationFailed {
        version: Version,
        script: String,
        reason: String,
    },

    /// G007: the ledger holds a failed migration above every available one
    #[error(
        "[G007] Ledger contains a failed migration at version {version}, above every \
         available migration"
    )]
    FailedFuture { version: Version },
}

impl EngineError {
    /// Wrap a database error from a ledger operation.
    pub(crate) fn ledger(context: impl Into<String>) -> impl FnOnce(DbError) -> EngineError {
        let context = context.into();
        move |source| EngineError::Ledger { context, source }
    }
}

/// Result type alias for EngineError
pub type EngineResult<T> = Result<T, EngineError>;
