//! Enrichment dispatcher
//!
//! Fire-and-forget scheduling of enrichment tasks. The request path only
//! spawns; it never waits on a summarizer.

use crate::db::SummaryId;
use crate::enrichment::EnrichmentWorker;
use crate::metrics::record_in_flight;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

/// Spawns one enrichment task per created record and tracks them for
/// shutdown
pub struct EnrichmentDispatcher {
    worker: EnrichmentWorker,
    tracker: TaskTracker,
    accepting: AtomicBool,
    in_flight: Arc<InFlight>,
}

/// Running-task count, published as a gauge and awaited by `wait_idle`
#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    idle: Notify,
}

impl InFlight {
    fn start(self: &Arc<Self>) -> InFlightGuard {
        let now = self.count.fetch_add(1, Ordering::AcqRel) + 1;
        record_in_flight(now);
        InFlightGuard(self.clone())
    }

    fn get(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }
}

/// Decrements on drop, so a task that unwinds still counts as finished
struct InFlightGuard(Arc<InFlight>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let now = self.0.count.fetch_sub(1, Ordering::AcqRel) - 1;
        record_in_flight(now);
        if now == 0 {
            self.0.idle.notify_waiters();
        }
    }
}

impl EnrichmentDispatcher {
    pub fn new(worker: EnrichmentWorker) -> Self {
        Self {
            worker,
            tracker: TaskTracker::new(),
            accepting: AtomicBool::new(true),
            in_flight: Arc::default(),
        }
    }

    /// Start enriching `id` in the background and return immediately.
    ///
    /// Returns `false` once the dispatcher is shutting down; the record then
    /// stays a stub.
    pub fn schedule(&self, id: SummaryId, url: String) -> bool {
        if !self.accepting.load(Ordering::Acquire) {
            warn!(summary_id = %id, "Dispatcher shutting down, enrichment skipped");
            return false;
        }

        let worker = self.worker.clone();
        let guard = self.in_flight.start();
        self.tracker.spawn(async move {
            let _guard = guard;
            worker.run(id, url).await;
        });

        debug!(summary_id = %id, in_flight = self.in_flight(), "Enrichment scheduled");
        true
    }

    /// Number of enrichment tasks that have not finished yet
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    /// Wait until no enrichment task is running. Tasks scheduled while
    /// waiting are waited for too.
    pub async fn wait_idle(&self) {
        loop {
            let idle = self.in_flight.idle.notified();
            tokio::pin!(idle);
            // Register before checking, so a notification in between is kept
            idle.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }
            idle.await;
        }
    }

    /// Stop accepting work and give running tasks `grace` to finish.
    ///
    /// Returns how many tasks were still running when the grace period ran
    /// out. Those are dropped with the runtime.
    pub async fn shutdown(&self, grace: Duration) -> usize {
        self.accepting.store(false, Ordering::Release);
        self.tracker.close();

        let pending = self.in_flight();
        if pending > 0 {
            info!(pending, grace_ms = grace.as_millis() as u64, "Draining enrichment tasks");
        }

        match tokio::time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => {
                info!("Enrichment dispatcher stopped");
                0
            }
            Err(_) => {
                let abandoned = self.in_flight();
                warn!(abandoned, "Enrichment tasks still running at shutdown");
                abandoned
            }
        }
    }
}
