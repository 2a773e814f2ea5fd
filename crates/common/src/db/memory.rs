//! Process-local summary store

use crate::db::{SummaryId, SummaryRecord, SummaryStore};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

/// `SummaryStore` kept in a map behind a single lock.
///
/// Ids come from a counter that only grows, so an id is never handed out
/// twice during the life of the store.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    records: BTreeMap<SummaryId, SummaryRecord>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SummaryStore for InMemoryStore {
    async fn create(&self, url: String) -> Result<SummaryRecord> {
        let mut state = self.state.write().await;
        state.last_id += 1;

        let id = SummaryId::try_from(state.last_id)?;
        let record = SummaryRecord {
            id,
            url,
            summary: String::new(),
            created_at: Utc::now(),
        };
        state.records.insert(id, record.clone());

        Ok(record)
    }

    async fn read(&self, id: SummaryId) -> Result<Option<SummaryRecord>> {
        Ok(self.state.read().await.records.get(&id).cloned())
    }

    async fn read_all(&self) -> Result<Vec<SummaryRecord>> {
        Ok(self.state.read().await.records.values().cloned().collect())
    }

    async fn update(
        &self,
        id: SummaryId,
        url: String,
        summary: String,
    ) -> Result<Option<SummaryRecord>> {
        let mut state = self.state.write().await;
        let Some(record) = state.records.get_mut(&id) else {
            return Ok(None);
        };

        record.url = url;
        record.summary = summary;
        Ok(Some(record.clone()))
    }

    async fn delete(&self, id: SummaryId) -> Result<Option<SummaryRecord>> {
        Ok(self.state.write().await.records.remove(&id))
    }

    async fn set_summary(&self, id: SummaryId, summary: String) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.records.get_mut(&id) {
            Some(record) => {
                record.summary = summary;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
