//! Migration value types shared between the resolver, the ledger, and the
//! info service.

use crate::error::{CoreError, CoreResult};
use crate::version::Version;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// The kind of a migration, as stored in the ledger's `type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationKind {
    /// A script-based migration discovered from a location.
    Sql,
    /// A programmatic migration registered by the host.
    Code,
    /// Synthetic entry recording that the engine created the managed schemas.
    Schema,
    /// Synthetic entry recording a baseline set with `init`.
    Init,
}

impl MigrationKind {
    /// Whether rows of this kind are engine-generated rather than
    /// author-supplied.
    pub fn is_synthetic(self) -> bool {
        matches!(self, MigrationKind::Schema | MigrationKind::Init)
    }
}

impl fmt::Display for MigrationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MigrationKind::Sql => "SQL",
            MigrationKind::Code => "CODE",
            MigrationKind::Schema => "SCHEMA",
            MigrationKind::Init => "INIT",
        };
        write!(f, "{s}")
    }
}

impl FromStr for MigrationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        match s {
            "SQL" => Ok(MigrationKind::Sql),
            "CODE" => Ok(MigrationKind::Code),
            "SCHEMA" => Ok(MigrationKind::Schema),
            "INIT" => Ok(MigrationKind::Init),
            other => Err(CoreError::UnknownMigrationKind(other.to_string())),
        }
    }
}

/// The state of a migration in the joined available/applied view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationState {
    /// Available but not yet applied.
    Pending,
    /// Applied successfully.
    Success,
    /// Application was attempted and failed.
    Failed,
    /// In the ledger but no longer available.
    Missing,
    /// In the ledger at a version above every available migration.
    Future,
    /// Available at a version below the current head.
    OutOfOrder,
}

impl MigrationState {
    /// Whether this state corresponds to a ledger row.
    pub fn is_applied(self) -> bool {
        matches!(
            self,
            MigrationState::Success
                | MigrationState::Failed
                | MigrationState::Missing
                | MigrationState::Future
        )
    }

    /// Whether this state records a failed application attempt.
    pub fn is_failed(self) -> bool {
        matches!(self, MigrationState::Failed)
    }
}

impl fmt::Display for MigrationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MigrationState::Pending => "Pending",
            MigrationState::Success => "Success",
            MigrationState::Failed => "Failed",
            MigrationState::Missing => "Missing",
            MigrationState::Future => "Future",
            MigrationState::OutOfOrder => "Out of Order",
        };
        write!(f, "{s}")
    }
}

/// A row of the ledger: one recorded migration application attempt.
#[derive(Debug, Clone)]
pub struct AppliedMigration {
    /// Monotonically increasing install counter, in commit order.
    pub installed_rank: i64,
    pub version: Version,
    pub description: String,
    pub kind: MigrationKind,
    /// Script file name for SQL migrations, type name for code migrations.
    pub script: String,
    pub checksum: Option<i32>,
    pub installed_by: String,
    pub installed_on: DateTime<Utc>,
    pub execution_time_ms: i64,
    pub success: bool,
    /// True on exactly one row: the ledger head.
    pub current: bool,
}

impl AppliedMigration {
    /// Whether this row is engine-generated (SCHEMA or INIT).
    pub fn is_synthetic(&self) -> bool {
        self.kind.is_synthetic()
    }
}

#[cfg(test)]
#[path = "migration_test.rs"]
mod tests;
