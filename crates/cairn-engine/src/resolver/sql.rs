//! SQL migration discovery from the configured locations.

use super::{MigrationExecutor, ResolvedMigration};
use crate::error::{EngineError, EngineResult};
use cairn_core::checksum::script_checksum;
use cairn_core::{Config, MigrationKind, Version};
use std::path::Path;

/// Scan every configured location for migration scripts.
///
/// Scripts are named `<prefix><version>__<description><suffix>`, e.g.
/// `V1_2__add_users.sql`. The version/description split is on the first
/// `__`; the description is optional. Locations that do not exist are
/// skipped with a warning; files that do not match the prefix and suffix
/// are ignored.
pub(crate) fn resolve_sql_migrations(config: &Config) -> EngineResult<Vec<ResolvedMigration>> {
    let placeholders = config.placeholder_map();
    let mut migrations = Vec::new();

    for location in &config.locations {
        let dir = Path::new(location);
        if !dir.is_dir() {
            log::warn!("Skipping non-existent migration location: {location}");
            continue;
        }

        let entries = std::fs::read_dir(dir).map_err(|e| EngineError::Resolve {
            script: location.clone(),
            reason: e.to_string(),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| EngineError::Resolve {
                script: location.clone(),
                reason: e.to_string(),
            })?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if name.len() < config.sql_migration_prefix.len() + config.sql_migration_suffix.len()
                || !name.starts_with(&config.sql_migration_prefix)
                || !name.ends_with(&config.sql_migration_suffix)
            {
                log::debug!("Ignoring non-migration file: {name}");
                continue;
            }

            let (version, description) = parse_file_name(
                name,
                &config.sql_migration_prefix,
                &config.sql_migration_suffix,
            )?;

            let content = std::fs::read_to_string(&path).map_err(|e| EngineError::Resolve {
                script: name.to_string(),
                reason: e.to_string(),
            })?;

            migrations.push(ResolvedMigration {
                version,
                description,
                kind: MigrationKind::Sql,
                script: name.to_string(),
                checksum: Some(script_checksum(&content)),
                executor: MigrationExecutor::Sql {
                    path,
                    placeholders: placeholders.clone(),
                },
            });
        }
    }

    Ok(migrations)
}

/// Split a migration file name into version and description.
pub(crate) fn parse_file_name(
    name: &str,
    prefix: &str,
    suffix: &str,
) -> EngineResult<(Version, String)> {
    let stem = &name[prefix.len()..name.len() - suffix.len()];

    let (version_part, description_part) = match stem.split_once("__") {
        Some((version, description)) => (version, description),
        None => (stem, ""),
    };

    let version = Version::parse(version_part).map_err(|e| EngineError::Resolve {
        script: name.to_string(),
        reason: e.to_string(),
    })?;
    if !version.is_numbered() {
        return Err(EngineError::Resolve {
            script: name.to_string(),
            reason: format!("'{version_part}' is not a valid migration version"),
        });
    }

    Ok((version, description_part.replace('_', " ")))
}
