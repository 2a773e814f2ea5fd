//! Enrichment worker
//!
//! Summarizes one record's URL and writes the text back.

use crate::db::{SummaryId, SummaryStore};
use crate::errors::AppError;
use crate::metrics::{record_enrichment, EnrichmentOutcome};
use crate::summarizer::Summarizer;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, instrument, warn};

/// Runs a single enrichment: summarize, then write back if the record exists
#[derive(Clone)]
pub struct EnrichmentWorker {
    store: Arc<dyn SummaryStore>,
    summarizer: Arc<dyn Summarizer>,
    timeout: Duration,
}

impl EnrichmentWorker {
    pub fn new(
        store: Arc<dyn SummaryStore>,
        summarizer: Arc<dyn Summarizer>,
        timeout: Duration,
    ) -> Self {
        Self {
            store,
            summarizer,
            timeout,
        }
    }

    /// Enrich the record. Never retries and never surfaces an error; the
    /// outcome is only logged and counted.
    #[instrument(skip(self), fields(summary_id = %id, provider = self.summarizer.name()))]
    pub async fn run(&self, id: SummaryId, url: String) -> EnrichmentOutcome {
        let start = Instant::now();
        let outcome = self.enrich(id, &url).await;
        let elapsed = start.elapsed();

        record_enrichment(elapsed.as_secs_f64(), self.summarizer.name(), outcome);
        debug!(
            outcome = outcome.as_str(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Enrichment finished"
        );

        outcome
    }

    async fn enrich(&self, id: SummaryId, url: &str) -> EnrichmentOutcome {
        let summarize = AssertUnwindSafe(self.summarizer.summarize(url)).catch_unwind();

        let summary = match tokio::time::timeout(self.timeout, summarize).await {
            Ok(Ok(Ok(summary))) => summary,
            Ok(Ok(Err(e))) => {
                warn!(error = %e, "Summarization failed, record keeps an empty summary");
                return EnrichmentOutcome::Failed;
            }
            Ok(Err(_)) => {
                error!("Summarizer panicked, record keeps an empty summary");
                return EnrichmentOutcome::Failed;
            }
            Err(_) => {
                let e = AppError::SummarizerTimeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                };
                warn!(error = %e, "Summarization timed out, record keeps an empty summary");
                return EnrichmentOutcome::Timeout;
            }
        };

        match self.store.set_summary(id, summary).await {
            Ok(true) => {
                info!("Summary enriched");
                EnrichmentOutcome::Success
            }
            Ok(false) => {
                debug!("Record deleted before enrichment finished, dropping summary");
                EnrichmentOutcome::Orphaned
            }
            Err(e) => {
                error!(error = %e, "Failed to store enriched summary");
                EnrichmentOutcome::StoreError
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{InMemoryStore, SummaryRecord};
    use crate::errors::Result;
    use crate::summarizer::MockSummarizer;
    use async_trait::async_trait;

    struct FailingSummarizer;

    #[async_trait]
    impl Summarizer for FailingSummarizer {
        async fn summarize(&self, _url: &str) -> Result<String> {
            Err(AppError::Summarizer {
                message: "unsupported content".into(),
            })
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    struct SlowSummarizer(Duration);

    #[async_trait]
    impl Summarizer for SlowSummarizer {
        async fn summarize(&self, _url: &str) -> Result<String> {
            tokio::time::sleep(self.0).await;
            Ok("too late".into())
        }

        fn name(&self) -> &str {
            "slow"
        }
    }

    struct PanickingSummarizer;

    #[async_trait]
    impl Summarizer for PanickingSummarizer {
        async fn summarize(&self, _url: &str) -> Result<String> {
            panic!("parser blew up")
        }

        fn name(&self) -> &str {
            "panicking"
        }
    }

    /// Accepts reads, fails the enrichment write
    #[derive(Default)]
    struct ReadOnlyStore {
        inner: InMemoryStore,
    }

    #[async_trait]
    impl SummaryStore for ReadOnlyStore {
        async fn create(&self, url: String) -> Result<SummaryRecord> {
            self.inner.create(url).await
        }

        async fn read(&self, id: SummaryId) -> Result<Option<SummaryRecord>> {
            self.inner.read(id).await
        }

        async fn read_all(&self) -> Result<Vec<SummaryRecord>> {
            self.inner.read_all().await
        }

        async fn update(
            &self,
            id: SummaryId,
            url: String,
            summary: String,
        ) -> Result<Option<SummaryRecord>> {
            self.inner.update(id, url, summary).await
        }

        async fn delete(&self, id: SummaryId) -> Result<Option<SummaryRecord>> {
            self.inner.delete(id).await
        }

        async fn set_summary(&self, _id: SummaryId, _summary: String) -> Result<bool> {
            Err(AppError::Database(sea_orm::DbErr::Custom("read-only transaction".into())))
        }

        async fn ping(&self) -> Result<()> {
            Ok(())
        }
    }

    fn worker(store: Arc<InMemoryStore>, summarizer: impl Summarizer + 'static) -> EnrichmentWorker {
        EnrichmentWorker::new(store, Arc::new(summarizer), Duration::from_millis(200))
    }

    #[tokio::test]
    async fn test_success_writes_summary() {
        let store = Arc::new(InMemoryStore::new());
        let record = store.create("http://example.com".into()).await.unwrap();

        let outcome = worker(store.clone(), MockSummarizer::new("generated"))
            .run(record.id, record.url.clone())
            .await;

        assert_eq!(outcome, EnrichmentOutcome::Success);
        let read = store.read(record.id).await.unwrap().unwrap();
        assert_eq!(read.summary, "generated");
        assert_eq!(read.url, "http://example.com");
    }

    #[tokio::test]
    async fn test_failure_leaves_stub() {
        let store = Arc::new(InMemoryStore::new());
        let record = store.create("http://example.com".into()).await.unwrap();

        let outcome = worker(store.clone(), FailingSummarizer)
            .run(record.id, record.url.clone())
            .await;

        assert_eq!(outcome, EnrichmentOutcome::Failed);
        assert!(store.read(record.id).await.unwrap().unwrap().is_stub());
    }

    #[tokio::test]
    async fn test_timeout_leaves_stub() {
        let store = Arc::new(InMemoryStore::new());
        let record = store.create("http://example.com".into()).await.unwrap();

        let outcome = worker(store.clone(), SlowSummarizer(Duration::from_secs(5)))
            .run(record.id, record.url.clone())
            .await;

        assert_eq!(outcome, EnrichmentOutcome::Timeout);
        assert!(store.read(record.id).await.unwrap().unwrap().is_stub());
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let store = Arc::new(InMemoryStore::new());
        let record = store.create("http://example.com".into()).await.unwrap();

        let outcome = worker(store.clone(), PanickingSummarizer)
            .run(record.id, record.url.clone())
            .await;

        assert_eq!(outcome, EnrichmentOutcome::Failed);
        assert!(store.read(record.id).await.unwrap().unwrap().is_stub());
    }

    #[tokio::test]
    async fn test_deleted_record_is_not_recreated() {
        let store = Arc::new(InMemoryStore::new());
        let record = store.create("http://example.com".into()).await.unwrap();
        store.delete(record.id).await.unwrap();

        let outcome = worker(store.clone(), MockSummarizer::default())
            .run(record.id, record.url.clone())
            .await;

        assert_eq!(outcome, EnrichmentOutcome::Orphaned);
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_store_failure_is_swallowed() {
        let store = Arc::new(ReadOnlyStore::default());
        let record = store.create("http://example.com".into()).await.unwrap();
        let worker = EnrichmentWorker::new(
            store.clone(),
            Arc::new(MockSummarizer::default()),
            Duration::from_millis(200),
        );

        let outcome = worker.run(record.id, record.url.clone()).await;

        assert_eq!(outcome, EnrichmentOutcome::StoreError);
        assert!(store.read(record.id).await.unwrap().unwrap().is_stub());
    }
}
