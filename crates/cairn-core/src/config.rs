//! Configuration types and parsing for cairn.yml

use crate::error::{CoreError, CoreResult};
use crate::placeholder::PlaceholderMap;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Main engine configuration from cairn.yml
///
/// A `Config` is built once (from defaults, a config file, or programmatic
/// construction) and passed into the engine by value; nothing mutates it
/// afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Directories to scan for migration scripts
    #[serde(default = "default_locations")]
    pub locations: Vec<String>,

    /// Character encoding of migration scripts (only UTF-8 is supported)
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Schemas managed by the engine. The first is the default schema and
    /// holds the ledger table. Empty means: use the connection's current
    /// schema.
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Name of the ledger table
    #[serde(default = "default_table")]
    pub table: String,

    /// Version cap: migrations above this version are not applied
    #[serde(default = "default_target")]
    pub target: String,

    /// Placeholder values substituted into migration scripts
    #[serde(default)]
    pub placeholders: HashMap<String, String>,

    /// Prefix of every placeholder token
    #[serde(default = "default_placeholder_prefix")]
    pub placeholder_prefix: String,

    /// Suffix of every placeholder token
    #[serde(default = "default_placeholder_suffix")]
    pub placeholder_suffix: String,

    /// File name prefix of SQL migrations
    #[serde(default = "default_sql_migration_prefix")]
    pub sql_migration_prefix: String,

    /// File name suffix of SQL migrations
    #[serde(default = "default_sql_migration_suffix")]
    pub sql_migration_suffix: String,

    /// Run validate before every migrate
    #[serde(default)]
    pub validate_on_migrate: bool,

    /// Clean the managed schemas instead of failing when validation finds
    /// differences. Development convenience only.
    #[serde(default)]
    pub clean_on_validation_error: bool,

    /// Version recorded for the baseline row written by init
    #[serde(default = "default_init_version")]
    pub init_version: String,

    /// Description recorded for the baseline row written by init
    #[serde(default = "default_init_description")]
    pub init_description: String,

    /// Automatically init when migrating a non-empty schema with no ledger
    #[serde(default)]
    pub init_on_migrate: bool,

    /// Tolerate a failed ledger row above every available migration
    #[serde(default)]
    pub ignore_failed_future_migration: bool,

    /// Apply migrations whose version is below the current head
    #[serde(default)]
    pub out_of_order: bool,

    /// Database connection configuration
    #[serde(default)]
    pub database: DatabaseConfig,
}

/// Database type selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DbType {
    /// DuckDB (default)
    #[default]
    DuckDb,
}

impl std::fmt::Display for DbType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DbType::DuckDb => write!(f, "duckdb"),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DatabaseConfig {
    /// Database type
    #[serde(rename = "type", default)]
    pub db_type: DbType,

    /// Database path (file path or :memory:)
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_locations() -> Vec<String> {
    vec!["migrations".to_string()]
}

fn default_encoding() -> String {
    "UTF-8".to_string()
}

fn default_table() -> String {
    "schema_version".to_string()
}

fn default_target() -> String {
    "latest".to_string()
}

fn default_placeholder_prefix() -> String {
    "${".to_string()
}

fn default_placeholder_suffix() -> String {
    "}".to_string()
}

fn default_sql_migration_prefix() -> String {
    "V".to_string()
}

fn default_sql_migration_suffix() -> String {
    ".sql".to_string()
}

fn default_init_version() -> String {
    "1".to_string()
}

fn default_init_description() -> String {
    "<< Cairn Init >>".to_string()
}

/// Default database path (in-memory)
pub const DEFAULT_DB_PATH: &str = ":memory:";

fn default_db_path() -> String {
    DEFAULT_DB_PATH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locations: default_locations(),
            encoding: default_encoding(),
            schemas: Vec::new(),
            table: default_table(),
            target: default_target(),
            placeholders: HashMap::new(),
            placeholder_prefix: default_placeholder_prefix(),
            placeholder_suffix: default_placeholder_suffix(),
            sql_migration_prefix: default_sql_migration_prefix(),
            sql_migration_suffix: default_sql_migration_suffix(),
            validate_on_migrate: false,
            clean_on_validation_error: false,
            init_version: default_init_version(),
            init_description: default_init_description(),
            init_on_migrate: false,
            ignore_failed_future_migration: false,
            out_of_order: false,
            database: DatabaseConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a project directory
    /// Looks for cairn.yml or cairn.yaml
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        let yml_path = dir.join("cairn.yml");
        let yaml_path = dir.join("cairn.yaml");

        if yml_path.exists() {
            Self::load(&yml_path)
        } else if yaml_path.exists() {
            Self::load(&yaml_path)
        } else {
            Err(CoreError::ConfigNotFound {
                path: dir.join("cairn.yml").display().to_string(),
            })
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> CoreResult<()> {
        if self.table.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Ledger table name cannot be empty".to_string(),
            });
        }
        if !self.encoding.eq_ignore_ascii_case("utf-8") {
            return Err(CoreError::ConfigInvalid {
                message: format!("Unsupported encoding '{}': only UTF-8 is supported", self.encoding),
            });
        }
        if self.placeholder_prefix.is_empty() || self.placeholder_suffix.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "Placeholder prefix and suffix cannot be empty".to_string(),
            });
        }
        if self.sql_migration_prefix.is_empty() || self.sql_migration_suffix.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "SQL migration prefix and suffix cannot be empty".to_string(),
            });
        }
        if self.locations.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "At least one migration location must be specified".to_string(),
            });
        }
        // Both versions must parse; target additionally accepts "latest".
        self.target_version()?;
        let init = self.init_version()?;
        if !init.is_numbered() {
            return Err(CoreError::ConfigInvalid {
                message: format!("init_version must be a numbered version, got '{}'", self.init_version),
            });
        }
        Ok(())
    }

    /// The configured target as a parsed [`Version`]
    pub fn target_version(&self) -> CoreResult<Version> {
        Version::parse(&self.target)
    }

    /// The configured init baseline as a parsed [`Version`]
    pub fn init_version(&self) -> CoreResult<Version> {
        Version::parse(&self.init_version)
    }

    /// The configured placeholders as a substitution map
    pub fn placeholder_map(&self) -> PlaceholderMap {
        PlaceholderMap::new(
            &self.placeholder_prefix,
            &self.placeholder_suffix,
            self.placeholders.clone(),
        )
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
