//! Database layer for TextSum
//!
//! Provides:
//! - The `SummaryStore` contract every component goes through
//! - SeaORM entity models and the SQL-backed `Repository`
//! - A process-local `InMemoryStore`
//! - Connection pool management and schema creation

mod memory;
pub mod models;
mod record;
mod repository;

pub use memory::InMemoryStore;
pub use record::{SummaryId, SummaryRecord};
pub use repository::Repository;

use crate::config::{DatabaseConfig, StoreBackend};
use crate::errors::{AppError, Result};
use async_trait::async_trait;
use models::TextSummaryEntity;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Schema};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Persistent collection of summary records.
///
/// Each call is atomic with respect to the record it addresses. Missing ids
/// come back as `None`/`false`; only backing-store failures are errors. No
/// call retries.
#[async_trait]
pub trait SummaryStore: Send + Sync {
    /// Insert a stub (empty summary, current timestamp)
    async fn create(&self, url: String) -> Result<SummaryRecord>;

    async fn read(&self, id: SummaryId) -> Result<Option<SummaryRecord>>;

    /// Snapshot of every live record, ascending by id
    async fn read_all(&self) -> Result<Vec<SummaryRecord>>;

    /// Overwrite url and summary together, returning the post-update record
    async fn update(
        &self,
        id: SummaryId,
        url: String,
        summary: String,
    ) -> Result<Option<SummaryRecord>>;

    /// Remove the record, returning it as it was immediately before removal
    async fn delete(&self, id: SummaryId) -> Result<Option<SummaryRecord>>;

    /// Enrichment write: replace only the summary text. Returns `false` if the
    /// record is gone; never recreates it.
    async fn set_summary(&self, id: SummaryId, summary: String) -> Result<bool>;

    /// Connectivity check for readiness probes
    async fn ping(&self) -> Result<()>;
}

/// Build the store selected by configuration
pub async fn connect_store(config: &DatabaseConfig) -> Result<Arc<dyn SummaryStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory summary store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Sql => {
            let pool = DbPool::new(config).await?;
            if config.auto_migrate {
                pool.ensure_schema().await?;
            }
            Ok(Arc::new(Repository::new(pool)))
        }
    }
}

/// Database connection pool wrapper
#[derive(Clone)]
pub struct DbPool {
    primary: DatabaseConnection,
}

impl DbPool {
    /// Create a new database pool from configuration
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        info!("Connecting to database...");

        let mut opts = ConnectOptions::new(&config.url);
        opts
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
            .sqlx_logging(true);

        // Every connection to an in-memory SQLite URL opens a separate,
        // empty database.
        if is_in_memory_sqlite(&config.url) {
            opts.max_connections(1).min_connections(1);
        }

        let primary = Database::connect(opts)
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Failed to connect: {}", e)
            })?;

        info!("Database connection established");

        Ok(Self { primary })
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.primary
    }

    /// Create the `text_summaries` table if it does not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        let backend = self.primary.get_database_backend();
        let schema = Schema::new(backend);

        let mut create = schema.create_table_from_entity(TextSummaryEntity);
        create.if_not_exists();

        self.primary.execute(backend.build(&create)).await?;

        info!(backend = ?backend, "Summary schema ensured");
        Ok(())
    }

    /// Ping the database to check connectivity
    pub async fn ping(&self) -> Result<()> {
        self.primary
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| AppError::DatabaseConnection {
                message: format!("Ping failed: {}", e),
            })?;

        Ok(())
    }
}

fn is_in_memory_sqlite(url: &str) -> bool {
    url.starts_with("sqlite:") && (url.contains(":memory:") || url.contains("mode=memory"))
}
