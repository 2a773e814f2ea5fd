//! Summary lifecycle service
//!
//! Turns store results into typed outcomes (not-found, invalid id) and hands
//! newly created records to the enrichment dispatcher.

use crate::db::{SummaryId, SummaryRecord, SummaryStore};
use crate::enrichment::EnrichmentDispatcher;
use crate::errors::{AppError, Result};
use crate::metrics::{record_lifecycle, LifecycleEvent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use url::Url;

/// What a client gets back from create, before any summary exists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedSummary {
    pub id: SummaryId,
    pub url: String,
}

/// Create, read, update and delete summary records
pub struct SummaryService {
    store: Arc<dyn SummaryStore>,
    dispatcher: Arc<EnrichmentDispatcher>,
}

impl SummaryService {
    pub fn new(store: Arc<dyn SummaryStore>, dispatcher: Arc<EnrichmentDispatcher>) -> Self {
        Self { store, dispatcher }
    }

    pub fn dispatcher(&self) -> &EnrichmentDispatcher {
        &self.dispatcher
    }

    /// Store a stub for `url` and start enriching it in the background.
    ///
    /// `url` must already be validated. Returns as soon as the stub is
    /// written.
    #[instrument(skip(self))]
    pub async fn create(&self, url: String) -> Result<CreatedSummary> {
        let record = self.store.create(url).await?;

        self.dispatcher.schedule(record.id, record.url.clone());
        record_lifecycle(LifecycleEvent::Created);
        info!(summary_id = %record.id, "Summary created");

        Ok(CreatedSummary {
            id: record.id,
            url: record.url,
        })
    }

    #[instrument(skip(self))]
    pub async fn read(&self, raw_id: &str) -> Result<SummaryRecord> {
        let id: SummaryId = raw_id.parse()?;

        self.store
            .read(id)
            .await?
            .ok_or_else(|| AppError::SummaryNotFound { id: id.get() })
    }

    pub async fn read_all(&self) -> Result<Vec<SummaryRecord>> {
        self.store.read_all().await
    }

    /// Overwrite url and summary. Competes with in-flight enrichment; the
    /// later store write wins.
    #[instrument(skip(self, summary))]
    pub async fn update(&self, raw_id: &str, url: String, summary: String) -> Result<SummaryRecord> {
        let id: SummaryId = raw_id.parse()?;

        let record = self
            .store
            .update(id, url, summary)
            .await?
            .ok_or_else(|| AppError::SummaryNotFound { id: id.get() })?;

        record_lifecycle(LifecycleEvent::Updated);
        info!(summary_id = %id, "Summary updated");
        Ok(record)
    }

    /// Delete the record and return the snapshot read before deleting it
    #[instrument(skip(self))]
    pub async fn delete(&self, raw_id: &str) -> Result<SummaryRecord> {
        let id: SummaryId = raw_id.parse()?;
        let not_found = || AppError::SummaryNotFound { id: id.get() };

        let snapshot = self.store.read(id).await?.ok_or_else(not_found)?;
        // Gone between the two calls means another delete won
        self.store.delete(id).await?.ok_or_else(not_found)?;

        record_lifecycle(LifecycleEvent::Deleted);
        info!(summary_id = %id, "Summary deleted");
        Ok(snapshot)
    }
}

/// Accept only absolute `http`/`https` URLs that name a host
pub fn validate_article_url(raw: &str) -> Result<Url> {
    let invalid = |message: String| AppError::Validation {
        message,
        field: Some("url".to_string()),
    };

    let parsed = Url::parse(raw).map_err(|e| invalid(format!("Invalid URL '{}': {}", raw, e)))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!(
            "URL scheme must be http or https, got '{}'",
            parsed.scheme()
        )));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid(format!("URL '{}' has no host", raw)));
    }

    Ok(parsed)
}
