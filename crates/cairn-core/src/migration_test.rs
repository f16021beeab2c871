//! Tests for migration kind and state types.

use super::{MigrationKind, MigrationState};

#[test]
fn kind_display_matches_ledger_strings() {
    assert_eq!(MigrationKind::Sql.to_string(), "SQL");
    assert_eq!(MigrationKind::Code.to_string(), "CODE");
    assert_eq!(MigrationKind::Schema.to_string(), "SCHEMA");
    assert_eq!(MigrationKind::Init.to_string(), "INIT");
}

#[test]
fn kind_parses_ledger_strings() {
    for kind in [
        MigrationKind::Sql,
        MigrationKind::Code,
        MigrationKind::Schema,
        MigrationKind::Init,
    ] {
        let parsed: MigrationKind = kind.to_string().parse().unwrap();
        assert_eq!(parsed, kind);
    }
}

#[test]
fn kind_rejects_unknown_strings() {
    assert!("sql".parse::<MigrationKind>().is_err());
    assert!("BASELINE".parse::<MigrationKind>().is_err());
}

#[test]
fn synthetic_kinds() {
    assert!(MigrationKind::Schema.is_synthetic());
    assert!(MigrationKind::Init.is_synthetic());
    assert!(!MigrationKind::Sql.is_synthetic());
    assert!(!MigrationKind::Code.is_synthetic());
}

#[test]
fn state_applied_and_failed_flags() {
    assert!(MigrationState::Success.is_applied());
    assert!(MigrationState::Failed.is_applied());
    assert!(MigrationState::Missing.is_applied());
    assert!(MigrationState::Future.is_applied());
    assert!(!MigrationState::Pending.is_applied());
    assert!(!MigrationState::OutOfOrder.is_applied());

    assert!(MigrationState::Failed.is_failed());
    assert!(!MigrationState::Success.is_failed());
}

#[test]
fn state_display() {
    assert_eq!(MigrationState::Pending.to_string(), "Pending");
    assert_eq!(MigrationState::OutOfOrder.to_string(), "Out of Order");
}
