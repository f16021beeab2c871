//! cairn-core - Core library for Cairn
//!
//! This crate provides the value types shared across the Cairn migration
//! engine: migration versions, migration metadata, configuration parsing,
//! script checksums, and placeholder substitution.

pub mod checksum;
pub mod config;
pub mod error;
pub mod migration;
pub mod placeholder;
pub mod version;

pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use migration::{AppliedMigration, MigrationKind, MigrationState};
pub use placeholder::PlaceholderMap;
pub use version::Version;
