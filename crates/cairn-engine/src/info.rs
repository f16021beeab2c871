//! The joined view of available and applied migrations.
//!
//! [`InfoService`] merges the catalog with the ledger into one
//! [`MigrationInfo`] per version (synthetic ledger rows keep their own
//! entry) and derives each entry's [`MigrationState`]. It also implements
//! `validate`, the drift check between the two sides.

use crate::resolver::ResolvedMigration;
use cairn_core::{AppliedMigration, MigrationKind, MigrationState, Version};
use chrono::{DateTime, Utc};

/// One migration in the unified status view.
#[derive(Debug, Clone)]
pub struct MigrationInfo {
    pub version: Version,
    pub description: String,
    pub kind: MigrationKind,
    pub script: String,
    pub checksum: Option<i32>,
    pub installed_on: Option<DateTime<Utc>>,
    pub execution_time_ms: Option<i64>,
    pub state: MigrationState,
}

/// An owned snapshot of the joined view, for hosts that outlive the
/// command's catalog.
#[derive(Debug, Clone)]
pub struct MigrationInfoReport {
    /// Every entry, sorted ascending by version.
    pub all: Vec<MigrationInfo>,
    /// The ledger head, if any row is current.
    pub current: Option<MigrationInfo>,
    /// Ledger entries in `installed_rank` order.
    pub applied: Vec<MigrationInfo>,
    /// Available entries that would be applied next, in order.
    pub pending: Vec<MigrationInfo>,
}

struct Entry<'a> {
    resolved: Option<&'a ResolvedMigration>,
    applied: Option<AppliedMigration>,
    info: MigrationInfo,
}

/// Joins the catalog and the ledger for one command invocation.
pub struct InfoService<'a> {
    entries: Vec<Entry<'a>>,
    out_of_order: bool,
}

impl<'a> InfoService<'a> {
    pub fn new(
        catalog: &'a [ResolvedMigration],
        applied: &[AppliedMigration],
        out_of_order: bool,
    ) -> Self {
        let head = applied
            .iter()
            .filter(|row| row.success)
            .map(|row| row.version.clone())
            .max()
            .unwrap_or(Version::Empty);
        let max_available = catalog
            .last()
            .map(|m| m.version.clone())
            .unwrap_or(Version::Empty);

        let mut entries = Vec::new();

        for row in applied {
            let resolved = if row.is_synthetic() {
                None
            } else {
                catalog.iter().find(|m| m.version == row.version)
            };
            let state = if row.is_synthetic() {
                MigrationState::Success
            } else if resolved.is_some() {
                if row.success {
                    MigrationState::Success
                } else {
                    MigrationState::Failed
                }
            } else if row.version > max_available {
                MigrationState::Future
            } else {
                MigrationState::Missing
            };
            entries.push(Entry {
                resolved,
                applied: Some(row.clone()),
                info: MigrationInfo {
                    version: row.version.clone(),
                    description: row.description.clone(),
                    kind: row.kind,
                    script: row.script.clone(),
                    checksum: row.checksum,
                    installed_on: Some(row.installed_on),
                    execution_time_ms: Some(row.execution_time_ms),
                    state,
                },
            });
        }

        for migration in catalog {
            let already_applied = applied
                .iter()
                .any(|row| !row.is_synthetic() && row.version == migration.version);
            if already_applied {
                continue;
            }
            let state = if migration.version <= head {
                MigrationState::OutOfOrder
            } else {
                MigrationState::Pending
            };
            entries.push(Entry {
                resolved: Some(migration),
                applied: None,
                info: MigrationInfo {
                    version: migration.version.clone(),
                    description: migration.description.clone(),
                    kind: migration.kind,
                    script: migration.script.clone(),
                    checksum: migration.checksum,
                    installed_on: None,
                    execution_time_ms: None,
                    state,
                },
            });
        }

        // Version order; entries sharing a version (synthetic rows beside a
        // real migration) order by installed_rank, unapplied entries last.
        entries.sort_by(|a, b| {
            let rank = |e: &Entry<'_>| {
                e.applied
                    .as_ref()
                    .map(|row| row.installed_rank)
                    .unwrap_or(i64::MAX)
            };
            (&a.info.version, rank(a)).cmp(&(&b.info.version, rank(b)))
        });

        Self {
            entries,
            out_of_order,
        }
    }

    /// Every entry, sorted ascending by version.
    pub fn all(&self) -> Vec<&MigrationInfo> {
        self.entries.iter().map(|e| &e.info).collect()
    }

    /// The entry for the ledger's current row, if any.
    pub fn current(&self) -> Option<&MigrationInfo> {
        self.entries
            .iter()
            .find(|e| e.applied.as_ref().is_some_and(|row| row.current))
            .map(|e| &e.info)
    }

    /// Ledger entries in `installed_rank` order.
    pub fn applied(&self) -> Vec<&MigrationInfo> {
        let mut rows: Vec<&Entry<'_>> =
            self.entries.iter().filter(|e| e.applied.is_some()).collect();
        rows.sort_by_key(|e| e.applied.as_ref().map(|row| row.installed_rank));
        rows.into_iter().map(|e| &e.info).collect()
    }

    /// Available entries that a migrate would apply, honoring the
    /// out-of-order policy.
    pub fn pending(&self) -> Vec<&MigrationInfo> {
        self.entries
            .iter()
            .filter(|e| match e.info.state {
                MigrationState::Pending => true,
                MigrationState::OutOfOrder => self.out_of_order,
                _ => false,
            })
            .map(|e| &e.info)
            .collect()
    }

    /// Check applied migrations against available ones.
    ///
    /// Returns a diagnostic for the first (lowest-version) discrepancy:
    /// checksum, then type, then description mismatches on successfully
    /// applied rows; applied rows missing from the catalog; and, when
    /// out-of-order is disallowed, available migrations skipped below the
    /// head.
    pub fn validate(&self) -> Option<String> {
        for entry in &self.entries {
            let version = &entry.info.version;
            match (&entry.resolved, &entry.applied) {
                (Some(resolved), Some(row)) if row.success => {
                    if resolved.checksum != row.checksum {
                        return Some(format!(
                            "checksum mismatch for migration {version}: applied {:?} but \
                             resolved locally {:?}",
                            row.checksum, resolved.checksum
                        ));
                    }
                    if resolved.kind != row.kind {
                        return Some(format!(
                            "type mismatch for migration {version}: applied {} but resolved \
                             locally {}",
                            row.kind, resolved.kind
                        ));
                    }
                    if resolved.description != row.description {
                        return Some(format!(
                            "description mismatch for migration {version}: applied '{}' but \
                             resolved locally '{}'",
                            row.description, resolved.description
                        ));
                    }
                }
                _ => {}
            }
            if entry.info.state == MigrationState::Missing {
                return Some(format!(
                    "detected applied migration missing from the configured locations: {version}"
                ));
            }
            if entry.info.state == MigrationState::OutOfOrder && !self.out_of_order {
                return Some(format!(
                    "detected resolved migration not applied to the database: {version}"
                ));
            }
        }
        None
    }

    /// Owned snapshot of the full view.
    pub fn report(&self) -> MigrationInfoReport {
        MigrationInfoReport {
            all: self.all().into_iter().cloned().collect(),
            current: self.current().cloned(),
            applied: self.applied().into_iter().cloned().collect(),
            pending: self.pending().into_iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
#[path = "info_test.rs"]
mod tests;
