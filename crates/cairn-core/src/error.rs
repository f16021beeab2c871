//! Error types for cairn-core

use thiserror::Error;

/// Core error type for Cairn
#[derive(Error, Debug)]
pub enum CoreError {
    /// C001: Configuration file not found
    #[error("[C001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// C002: Invalid configuration value
    #[error("[C002] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// C003: Version string cannot be parsed
    #[error("[C003] Invalid version '{version}': {reason}")]
    InvalidVersion { version: String, reason: String },

    /// C004: Unknown migration type stored in the ledger
    #[error("[C004] Unknown migration type: {0}")]
    UnknownMigrationKind(String),

    /// C005: Script references a placeholder with no configured value
    #[error("[C005] Unresolved placeholder {token} in {script}")]
    UnresolvedPlaceholder { token: String, script: String },

    /// C006: IO error
    #[error("[C006] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// C007: IO error with file path context
    #[error("[C007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// C008: Config YAML parse error
    #[error("[C008] Config parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
