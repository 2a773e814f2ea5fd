//! Background enrichment
//!
//! After a summary record is created, its URL is summarized on a detached
//! task and the text written back to the record:
//! 1. `EnrichmentDispatcher` spawns one task per created record
//! 2. `EnrichmentWorker` runs the summarizer under a timeout
//! 3. The result lands through `SummaryStore::set_summary`, or nowhere if the
//!    record was deleted meanwhile
//!
//! Failures never reach a client; the record simply keeps an empty summary.

mod dispatcher;
mod worker;

pub use dispatcher::EnrichmentDispatcher;
pub use worker::EnrichmentWorker;
