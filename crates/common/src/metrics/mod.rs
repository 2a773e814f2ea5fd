//! Metrics and observability utilities
//!
//! Prometheus metrics for the summary lifecycle and background enrichment,
//! with standardized naming conventions.

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};

/// Metrics prefix for all TextSum metrics
pub const METRICS_PREFIX: &str = "textsum";

/// Buckets for enrichment latency (page fetch + summarization)
pub const ENRICHMENT_BUCKETS: &[f64] = &[
    0.100,  // 100ms
    0.250,  // 250ms
    0.500,  // 500ms
    1.000,  // 1s
    2.000,  // 2s
    5.000,  // 5s
    10.00,  // 10s
    30.00,  // 30s - default summarizer timeout
    60.00,  // 60s
];

/// How one background enrichment ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Summary written to the record
    Success,
    /// Summarizer returned an error
    Failed,
    /// Summarizer exceeded its time budget
    Timeout,
    /// Record deleted before the summary could be written
    Orphaned,
    /// Summary produced but the store write failed
    StoreError,
}

impl EnrichmentOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrichmentOutcome::Success => "success",
            EnrichmentOutcome::Failed => "failed",
            EnrichmentOutcome::Timeout => "timeout",
            EnrichmentOutcome::Orphaned => "orphaned",
            EnrichmentOutcome::StoreError => "store_error",
        }
    }
}

/// Register all metric descriptions
pub fn register_metrics() {
    // Lifecycle metrics
    describe_counter!(
        format!("{}_summaries_created_total", METRICS_PREFIX),
        Unit::Count,
        "Total summary records created"
    );

    describe_counter!(
        format!("{}_summaries_updated_total", METRICS_PREFIX),
        Unit::Count,
        "Total explicit summary updates"
    );

    describe_counter!(
        format!("{}_summaries_deleted_total", METRICS_PREFIX),
        Unit::Count,
        "Total summary records deleted"
    );

    // Enrichment metrics
    describe_counter!(
        format!("{}_enrichment_total", METRICS_PREFIX),
        Unit::Count,
        "Background enrichments by outcome"
    );

    describe_histogram!(
        format!("{}_enrichment_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Background enrichment latency in seconds"
    );

    describe_gauge!(
        format!("{}_enrichment_in_flight", METRICS_PREFIX),
        Unit::Count,
        "Enrichment tasks currently running"
    );

    tracing::info!("Metrics registered");
}

/// Lifecycle operation that changed the store
#[derive(Debug, Clone, Copy)]
pub enum LifecycleEvent {
    Created,
    Updated,
    Deleted,
}

/// Helper to record lifecycle metrics
pub fn record_lifecycle(event: LifecycleEvent) {
    let name = match event {
        LifecycleEvent::Created => "summaries_created_total",
        LifecycleEvent::Updated => "summaries_updated_total",
        LifecycleEvent::Deleted => "summaries_deleted_total",
    };

    counter!(format!("{}_{}", METRICS_PREFIX, name)).increment(1);
}

/// Helper to record enrichment metrics
pub fn record_enrichment(duration_secs: f64, provider: &str, outcome: EnrichmentOutcome) {
    counter!(
        format!("{}_enrichment_total", METRICS_PREFIX),
        "provider" => provider.to_string(),
        "status" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        format!("{}_enrichment_duration_seconds", METRICS_PREFIX),
        "provider" => provider.to_string()
    )
    .record(duration_secs);
}

/// Helper to publish the number of running enrichment tasks
pub fn record_in_flight(count: usize) {
    gauge!(format!("{}_enrichment_in_flight", METRICS_PREFIX)).set(count as f64);
}
