//! Tests for configuration defaults, loading, and validation.

use super::{Config, DbType};
use crate::version::Version;
use std::fs;

#[test]
fn defaults_are_complete() {
    let config = Config::default();
    assert_eq!(config.locations, vec!["migrations"]);
    assert_eq!(config.encoding, "UTF-8");
    assert!(config.schemas.is_empty());
    assert_eq!(config.table, "schema_version");
    assert_eq!(config.target, "latest");
    assert_eq!(config.placeholder_prefix, "${");
    assert_eq!(config.placeholder_suffix, "}");
    assert_eq!(config.sql_migration_prefix, "V");
    assert_eq!(config.sql_migration_suffix, ".sql");
    assert_eq!(config.init_version, "1");
    assert_eq!(config.init_description, "<< Cairn Init >>");
    assert!(!config.validate_on_migrate);
    assert!(!config.clean_on_validation_error);
    assert!(!config.init_on_migrate);
    assert!(!config.ignore_failed_future_migration);
    assert!(!config.out_of_order);
    assert_eq!(config.database.db_type, DbType::DuckDb);
    assert_eq!(config.database.path, ":memory:");
    config.validate().unwrap();
}

#[test]
fn loads_yaml_with_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cairn.yml");
    fs::write(
        &path,
        "locations:\n  - db/migration\nschemas:\n  - app\n  - audit\ntable: version_history\ntarget: \"3.1\"\nout_of_order: true\nplaceholders:\n  owner: app_user\n",
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.locations, vec!["db/migration"]);
    assert_eq!(config.schemas, vec!["app", "audit"]);
    assert_eq!(config.table, "version_history");
    assert_eq!(config.target_version().unwrap(), Version::parse("3.1").unwrap());
    assert!(config.out_of_order);
    assert_eq!(config.placeholders["owner"], "app_user");
    // Unset fields keep their defaults.
    assert_eq!(config.sql_migration_prefix, "V");
}

#[test]
fn load_from_dir_finds_yml_and_yaml() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("cairn.yaml"), "table: t\n").unwrap();
    let config = Config::load_from_dir(dir.path()).unwrap();
    assert_eq!(config.table, "t");
}

#[test]
fn missing_file_is_config_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::load_from_dir(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn unknown_fields_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cairn.yml");
    fs::write(&path, "tables: oops\n").unwrap();
    assert!(Config::load(&path).is_err());
}

#[test]
fn validate_rejects_bad_values() {
    let mut config = Config::default();
    config.table = String::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.encoding = "latin-1".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.placeholder_prefix = String::new();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.locations.clear();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.target = "not-a-version".to_string();
    assert!(config.validate().is_err());

    let mut config = Config::default();
    config.init_version = "latest".to_string();
    assert!(config.validate().is_err());
}

#[test]
fn target_latest_parses_to_sentinel() {
    let config = Config::default();
    assert_eq!(config.target_version().unwrap(), Version::Latest);
}

#[test]
fn placeholder_map_uses_configured_delimiters() {
    let mut config = Config::default();
    config.placeholder_prefix = "{{".to_string();
    config.placeholder_suffix = "}}".to_string();
    config
        .placeholders
        .insert("name".to_string(), "value".to_string());

    let result = config
        .placeholder_map()
        .substitute("{{name}}", "s")
        .unwrap();
    assert_eq!(result, "value");
}
