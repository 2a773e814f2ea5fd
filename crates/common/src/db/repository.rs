//! Repository pattern for database operations
//!
//! SQL-backed `SummaryStore`. Every operation is a single statement or a
//! short transaction, so readers never observe a partial write.

use crate::db::models::*;
use crate::db::{DbPool, SummaryId, SummaryRecord, SummaryStore};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    NotSet, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// Repository for summary records
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.connection()
    }
}

#[async_trait]
impl SummaryStore for Repository {
    async fn create(&self, url: String) -> Result<SummaryRecord> {
        let summary = TextSummaryActiveModel {
            id: NotSet,
            url: Set(url),
            summary: Set(String::new()),
            created_at: Set(Utc::now().into()),
        };

        let model = summary.insert(self.conn()).await?;
        Ok(model.into())
    }

    async fn read(&self, id: SummaryId) -> Result<Option<SummaryRecord>> {
        let Some(key) = id.as_key() else {
            return Ok(None);
        };

        let model = TextSummaryEntity::find_by_id(key).one(self.conn()).await?;
        Ok(model.map(Into::into))
    }

    async fn read_all(&self) -> Result<Vec<SummaryRecord>> {
        let models = TextSummaryEntity::find()
            .order_by_asc(TextSummaryColumn::Id)
            .all(self.conn())
            .await?;

        Ok(models.into_iter().map(Into::into).collect())
    }

    async fn update(
        &self,
        id: SummaryId,
        url: String,
        summary: String,
    ) -> Result<Option<SummaryRecord>> {
        let Some(key) = id.as_key() else {
            return Ok(None);
        };

        // The row stays locked until commit, so the re-read sees this write
        // and not a later one.
        let txn = self.conn().begin().await?;

        let result = TextSummaryEntity::update_many()
            .col_expr(TextSummaryColumn::Url, Expr::value(url))
            .col_expr(TextSummaryColumn::Summary, Expr::value(summary))
            .filter(TextSummaryColumn::Id.eq(key))
            .exec(&txn)
            .await?;

        if result.rows_affected == 0 {
            txn.rollback().await?;
            return Ok(None);
        }

        let model = TextSummaryEntity::find_by_id(key).one(&txn).await?;
        txn.commit().await?;

        Ok(model.map(Into::into))
    }

    async fn delete(&self, id: SummaryId) -> Result<Option<SummaryRecord>> {
        let Some(key) = id.as_key() else {
            return Ok(None);
        };

        let txn = self.conn().begin().await?;

        // SQLite serializes writers on its own and has no row locks
        let mut select = TextSummaryEntity::find_by_id(key);
        if txn.get_database_backend() == DbBackend::Postgres {
            select = select.lock_exclusive();
        }

        let Some(existing) = select.one(&txn).await? else {
            txn.rollback().await?;
            return Ok(None);
        };

        let result = TextSummaryEntity::delete_by_id(key).exec(&txn).await?;
        txn.commit().await?;

        if result.rows_affected == 0 {
            return Ok(None);
        }

        Ok(Some(existing.into()))
    }

    async fn set_summary(&self, id: SummaryId, summary: String) -> Result<bool> {
        let Some(key) = id.as_key() else {
            return Ok(false);
        };

        let result = TextSummaryEntity::update_many()
            .col_expr(TextSummaryColumn::Summary, Expr::value(summary))
            .filter(TextSummaryColumn::Id.eq(key))
            .exec(self.conn())
            .await?;

        Ok(result.rows_affected > 0)
    }

    async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    async fn sqlite_repository() -> Repository {
        let config = DatabaseConfig {
            url: "sqlite::memory:".to_string(),
            ..DatabaseConfig::default()
        };
        let pool = DbPool::new(&config).await.unwrap();
        pool.ensure_schema().await.unwrap();
        Repository::new(pool)
    }

    fn id(value: i64) -> SummaryId {
        SummaryId::new(value).unwrap()
    }

    #[tokio::test]
    async fn test_create_inserts_stub() {
        let repo = sqlite_repository().await;

        let created = repo.create("http://example.com".into()).await.unwrap();
        assert_eq!(created.url, "http://example.com");
        assert!(created.is_stub());

        let read = repo.read(created.id).await.unwrap().unwrap();
        assert_eq!(read, created);
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let repo = sqlite_repository().await;

        let first = repo.create("http://a.example".into()).await.unwrap();
        let second = repo.create("http://b.example".into()).await.unwrap();
        assert_ne!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let repo = sqlite_repository().await;
        assert!(repo.read(id(9_999_999)).await.unwrap().is_none());
        assert!(repo.read(id(i64::MAX)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_all_in_insertion_order() {
        let repo = sqlite_repository().await;
        let first = repo.create("http://a.example".into()).await.unwrap();
        let second = repo.create("http://b.example".into()).await.unwrap();

        let all = repo.read_all().await.unwrap();
        assert_eq!(all, vec![first, second]);
    }

    #[tokio::test]
    async fn test_update_overwrites_both_fields() {
        let repo = sqlite_repository().await;
        let created = repo.create("http://a.example".into()).await.unwrap();
        repo.set_summary(created.id, "auto".into()).await.unwrap();

        let updated = repo
            .update(created.id, "http://b.example".into(), "manual".into())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.url, "http://b.example");
        assert_eq!(updated.summary, "manual");
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(repo.read(created.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_update_missing_is_none() {
        let repo = sqlite_repository().await;
        let result = repo
            .update(id(5), "http://example.com".into(), "text".into())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_delete_returns_prior_state() {
        let repo = sqlite_repository().await;
        let created = repo.create("http://example.com".into()).await.unwrap();
        repo.set_summary(created.id, "enriched".into()).await.unwrap();

        let deleted = repo.delete(created.id).await.unwrap().unwrap();
        assert_eq!(deleted.summary, "enriched");

        assert!(repo.read(created.id).await.unwrap().is_none());
        assert!(repo.delete(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_set_summary_after_delete_is_noop() {
        let repo = sqlite_repository().await;
        let created = repo.create("http://example.com".into()).await.unwrap();
        repo.delete(created.id).await.unwrap();

        assert!(!repo.set_summary(created.id, "late".into()).await.unwrap());
        assert!(repo.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_summary_keeps_url() {
        let repo = sqlite_repository().await;
        let created = repo.create("http://example.com".into()).await.unwrap();
        repo.update(created.id, "http://other.example".into(), String::new())
            .await
            .unwrap();

        assert!(repo.set_summary(created.id, "auto".into()).await.unwrap());

        let read = repo.read(created.id).await.unwrap().unwrap();
        assert_eq!(read.url, "http://other.example");
        assert_eq!(read.summary, "auto");
    }
}
