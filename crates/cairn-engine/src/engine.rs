//! The Cairn engine facade.
//!
//! [`Cairn`] is the host-facing entry point: it holds the immutable
//! configuration, the connection provider, and the registered code
//! migrations, and dispatches the commands (migrate, info, validate, init,
//! repair, clean). Every command takes two connections from the provider:
//! one for the ledger, one for user objects. Both are closed on every exit
//! path when the command's context drops.

use crate::clean::clean_schemas;
use crate::error::{EngineError, EngineResult};
use crate::executor::Executor;
use crate::info::{InfoService, MigrationInfoReport};
use crate::metadata::MetadataTable;
use crate::resolver::{resolve_migrations, CodeMigration, ResolvedMigration};
use cairn_core::config::DbType;
use cairn_core::{Config, MigrationKind};
use cairn_db::{adapter_for, ConnectionProvider, DatabaseAdapter, DuckDbProvider};
use duckdb::Connection;
use std::sync::Arc;

/// The migration engine.
pub struct Cairn {
    config: Config,
    provider: Box<dyn ConnectionProvider>,
    code_migrations: Vec<Arc<dyn CodeMigration>>,
}

/// Per-command resources: the two connections, the adapter, and the
/// resolved schema list.
struct CommandContext {
    meta_conn: Connection,
    user_conn: Connection,
    adapter: Box<dyn DatabaseAdapter>,
    schemas: Vec<String>,
}

impl Cairn {
    /// Build an engine from a validated configuration and a connection
    /// provider.
    pub fn new(config: Config, provider: Box<dyn ConnectionProvider>) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            provider,
            code_migrations: Vec::new(),
        })
    }

    /// Build an engine that opens its own database from the configured
    /// `database` block.
    pub fn from_config(config: Config) -> EngineResult<Self> {
        let provider = match config.database.db_type {
            DbType::DuckDb => DuckDbProvider::open(&config.database.path)?,
        };
        Self::new(config, Box::new(provider))
    }

    /// Register a programmatic migration. The resolver merges it with the
    /// script-based migrations on every command.
    pub fn register_code_migration(&mut self, migration: Arc<dyn CodeMigration>) {
        self.code_migrations.push(migration);
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ── Commands ───────────────────────────────────────────────────────

    /// Apply all pending migrations in order. Returns the number of
    /// successfully applied migrations.
    pub fn migrate(&self) -> EngineResult<usize> {
        let ctx = self.context()?;
        let created = self.create_schemas_if_necessary(&ctx)?;
        ctx.adapter
            .set_current_schema(&ctx.user_conn, &ctx.schemas[0])?;

        let catalog = resolve_migrations(&self.config, &self.code_migrations)?;
        let metadata = self.metadata(&ctx);

        if self.config.validate_on_migrate {
            self.do_validate(&ctx, &catalog, &metadata)?;
        }

        if !metadata.exists()? {
            let mut non_empty = Vec::new();
            for schema in &ctx.schemas {
                if !ctx.adapter.schema_empty(&ctx.meta_conn, schema)? {
                    non_empty.push(schema.clone());
                }
            }

            if non_empty.is_empty() || self.config.init_on_migrate {
                metadata.create_if_not_exists()?;
                if created {
                    metadata.schemas_created(&ctx.schemas)?;
                }
                if self.config.init_on_migrate && !non_empty.is_empty() {
                    metadata.init(&self.config.init_version()?, &self.config.init_description)?;
                }
            } else {
                return Err(EngineError::UnexpectedState(format!(
                    "Found non-empty schema '{}' without a ledger table; run init first or \
                     set init_on_migrate",
                    non_empty[0]
                )));
            }
        }

        let executor = Executor::new(
            &metadata,
            &ctx.user_conn,
            ctx.adapter.as_ref(),
            self.config.target_version()?,
            self.config.out_of_order,
            self.config.ignore_failed_future_migration,
        );
        executor.migrate(&catalog)
    }

    /// The unified status view of available and applied migrations.
    pub fn info(&self) -> EngineResult<MigrationInfoReport> {
        let ctx = self.context()?;
        let catalog = resolve_migrations(&self.config, &self.code_migrations)?;
        let metadata = self.metadata(&ctx);
        let applied = if metadata.exists()? {
            metadata.all_applied()?
        } else {
            Vec::new()
        };
        Ok(InfoService::new(&catalog, &applied, self.config.out_of_order).report())
    }

    /// Check applied migrations against the available ones.
    pub fn validate(&self) -> EngineResult<()> {
        let ctx = self.context()?;
        let catalog = resolve_migrations(&self.config, &self.code_migrations)?;
        let metadata = self.metadata(&ctx);
        self.do_validate(&ctx, &catalog, &metadata)
    }

    /// Create the ledger and record a baseline at the configured init
    /// version. Fails if the ledger already holds migrations.
    pub fn init(&self) -> EngineResult<()> {
        let ctx = self.context()?;
        let created = self.create_schemas_if_necessary(&ctx)?;
        let metadata = self.metadata(&ctx);
        if created {
            metadata.schemas_created(&ctx.schemas)?;
        }
        metadata.init(&self.config.init_version()?, &self.config.init_description)
    }

    /// Remove failed ledger rows and reconcile checksums so migrate can
    /// resume after a failure.
    pub fn repair(&self) -> EngineResult<()> {
        let ctx = self.context()?;
        let catalog = resolve_migrations(&self.config, &self.code_migrations)?;
        let metadata = self.metadata(&ctx);
        if !metadata.exists()? {
            log::warn!("No ledger table found; nothing to repair");
            return Ok(());
        }
        metadata.repair(&catalog)
    }

    /// Drop all objects in the managed schemas (including the ledger).
    pub fn clean(&self) -> EngineResult<()> {
        let ctx = self.context()?;
        self.do_clean(&ctx)
    }

    // ── Shared command plumbing ────────────────────────────────────────

    fn context(&self) -> EngineResult<CommandContext> {
        let meta_conn = self.provider.connection()?;
        let user_conn = self.provider.connection()?;
        let adapter = adapter_for(self.config.database.db_type);

        let schemas = if self.config.schemas.is_empty() {
            vec![adapter.current_schema(&meta_conn)?]
        } else {
            self.config.schemas.clone()
        };
        log::debug!(
            "DDL transactions supported: {}",
            adapter.supports_ddl_transactions()
        );
        log::debug!("Schemas: {}", schemas.join(", "));

        Ok(CommandContext {
            meta_conn,
            user_conn,
            adapter,
            schemas,
        })
    }

    fn metadata<'c>(&'c self, ctx: &'c CommandContext) -> MetadataTable<'c> {
        MetadataTable::new(
            &ctx.meta_conn,
            ctx.adapter.as_ref(),
            &ctx.schemas[0],
            &self.config.table,
        )
    }

    /// Create the managed schemas when none of them exist yet.
    ///
    /// Returns true only when this invocation created them; the caller
    /// records a SCHEMA marker in that case.
    fn create_schemas_if_necessary(&self, ctx: &CommandContext) -> EngineResult<bool> {
        for schema in &ctx.schemas {
            if ctx.adapter.schema_exists(&ctx.meta_conn, schema)? {
                log::debug!("Schema {schema} already exists; skipping schema creation");
                return Ok(false);
            }
        }
        for schema in &ctx.schemas {
            log::info!("Creating schema {schema}");
            ctx.adapter.create_schema(&ctx.meta_conn, schema)?;
        }
        Ok(true)
    }

    fn do_validate(
        &self,
        ctx: &CommandContext,
        catalog: &[ResolvedMigration],
        metadata: &MetadataTable<'_>,
    ) -> EngineResult<()> {
        if !metadata.exists()? {
            log::info!("No ledger table; nothing to validate");
            return Ok(());
        }
        let applied = metadata.all_applied()?;
        if applied.is_empty() {
            log::info!("No migrations applied yet; nothing to validate");
            return Ok(());
        }

        let service = InfoService::new(catalog, &applied, self.config.out_of_order);
        log::info!("Validated {} migrations", service.all().len());

        match service.validate() {
            None => Ok(()),
            Some(diagnostic) => {
                if self.config.clean_on_validation_error {
                    log::warn!("Validation failed ({diagnostic}); cleaning configured schemas");
                    self.do_clean(ctx)
                } else {
                    Err(EngineError::ValidationFailed(diagnostic))
                }
            }
        }
    }

    fn do_clean(&self, ctx: &CommandContext) -> EngineResult<()> {
        let metadata = self.metadata(ctx);
        let drop_schemas = if metadata.exists()? {
            metadata
                .all_applied()?
                .first()
                .map(|row| row.kind == MigrationKind::Schema)
                .unwrap_or(false)
        } else {
            false
        };
        clean_schemas(
            &ctx.user_conn,
            ctx.adapter.as_ref(),
            &ctx.schemas,
            drop_schemas,
        )
    }
}

#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;
