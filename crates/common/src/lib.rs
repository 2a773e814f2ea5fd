//! TextSum Common Library
//!
//! Shared code for the TextSum service including:
//! - Summary records and the storage contract
//! - Summarizer abstraction
//! - Background enrichment
//! - Error types and handling
//! - Configuration management
//! - Metrics and observability

pub mod config;
pub mod db;
pub mod enrichment;
pub mod errors;
pub mod metrics;
pub mod services;
pub mod summarizer;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{SummaryId, SummaryRecord, SummaryStore};
pub use enrichment::{EnrichmentDispatcher, EnrichmentWorker};
pub use errors::{AppError, Result};
pub use services::{validate_article_url, CreatedSummary, SummaryService};
pub use summarizer::Summarizer;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
