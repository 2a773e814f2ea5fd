//! Article summarization abstraction
//!
//! Provides a unified interface for summary providers:
//! - Extractive (fetch the page, keep its highest-scoring sentences)
//! - Mock (fixed text, for tests and local runs)

mod extractive;

pub use extractive::{rank_sentences, ArticleSummarizer};

use crate::config::SummarizerConfig;
use crate::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Trait for turning a URL into summary text
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Fetch the article behind `url` and summarize it
    async fn summarize(&self, url: &str) -> Result<String>;

    /// Provider name, used in logs and metrics
    fn name(&self) -> &str;
}

/// Mock summarizer for testing
pub struct MockSummarizer {
    text: String,
}

impl MockSummarizer {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for MockSummarizer {
    fn default() -> Self {
        Self::new("summary")
    }
}

#[async_trait]
impl Summarizer for MockSummarizer {
    async fn summarize(&self, _url: &str) -> Result<String> {
        Ok(self.text.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Create a summarizer based on configuration
pub fn create_summarizer(config: &SummarizerConfig) -> Result<Arc<dyn Summarizer>> {
    match config.provider.as_str() {
        "extractive" => Ok(Arc::new(ArticleSummarizer::new(config)?)),
        "mock" => Ok(Arc::new(MockSummarizer::default())),
        other => {
            tracing::warn!(provider = other, "Unknown summarizer provider, using extractive");
            Ok(Arc::new(ArticleSummarizer::new(config)?))
        }
    }
}
