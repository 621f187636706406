//! DispatchSupervisor - bounded pool of persist workers
//!
//! Each decoded payload becomes one independent persistence attempt. The
//! worker count bounds how many store operations can be in flight at once,
//! so an unbounded arrival rate cannot exhaust the connection pool. No
//! ordering guarantee exists between attempts; the assigned id reflects
//! commit order at the store, not arrival order.

use std::sync::Arc;

use async_channel::Receiver;
use contracts::{ReportPayload, ReportStore};
use metrics::counter;
use tokio::task::JoinHandle;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, instrument, warn};

use crate::metrics::DispatchMetrics;

/// Bound on how long shutdown waits for the workers to drain the queue.
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Supervisor over the persist worker pool.
///
/// Holds `None` for the store in degraded mode: every payload is then
/// dropped with a warning instead of persisted.
pub struct DispatchSupervisor {
    workers: Vec<JoinHandle<()>>,
    metrics: Arc<DispatchMetrics>,
}

impl DispatchSupervisor {
    /// Spawn `workers` persist tasks over the shared queue.
    #[instrument(name = "dispatch_supervisor_spawn", skip(store, rx))]
    pub fn spawn(
        store: Option<Arc<dyn ReportStore>>,
        rx: Receiver<ReportPayload>,
        workers: usize,
    ) -> Self {
        let metrics = Arc::new(DispatchMetrics::new());

        let handles = (0..workers)
            .map(|worker_id| {
                let store = store.clone();
                let rx = rx.clone();
                let metrics = Arc::clone(&metrics);
                tokio::spawn(async move {
                    persist_worker(worker_id, store, rx, metrics).await;
                })
            })
            .collect();

        info!(workers, degraded = store.is_none(), "dispatch supervisor started");

        Self {
            workers: handles,
            metrics,
        }
    }

    /// Shared dispatch metrics
    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Drain the queue and stop all workers.
    ///
    /// The queue must already be closed (all senders dropped); workers then
    /// finish the remaining payloads and exit. Waits up to the drain bound
    /// per worker.
    #[instrument(name = "dispatch_supervisor_shutdown", skip(self))]
    pub async fn shutdown(self) {
        for handle in self.workers {
            match timeout(DRAIN_TIMEOUT, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = ?e, "persist worker panicked"),
                Err(_) => warn!("persist worker did not drain in time, abandoned"),
            }
        }
        info!("dispatch supervisor shutdown complete");
    }
}

/// Worker loop: one persistence attempt per payload, failures contained.
#[instrument(name = "persist_worker_loop", skip(store, rx, metrics))]
async fn persist_worker(
    worker_id: usize,
    store: Option<Arc<dyn ReportStore>>,
    rx: Receiver<ReportPayload>,
    metrics: Arc<DispatchMetrics>,
) {
    debug!(worker_id, "persist worker started");

    while let Ok(payload) = rx.recv().await {
        metrics.set_queue_len(rx.len());

        let Some(store) = store.as_ref() else {
            metrics.inc_failure_count();
            counter!("geotrack_persist_failures_total").increment(1);
            warn!(worker_id, "storage unavailable, report dropped");
            continue;
        };

        match store.insert(&payload).await {
            Ok(id) => {
                metrics.inc_persisted_count();
                counter!("geotrack_reports_persisted_total").increment(1);
                debug!(worker_id, id, "report persisted");
            }
            Err(e) => {
                metrics.inc_failure_count();
                counter!("geotrack_persist_failures_total").increment(1);
                warn!(worker_id, error = %e, "persist failed, report dropped");
                // Continue processing - one bad report never affects others
            }
        }
    }

    debug!(worker_id, "persist worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use contracts::{ContractError, LatestReport, LocationReport};
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;
    use tokio::time::sleep;

    /// Mock store for testing
    #[derive(Default)]
    struct MockStore {
        next_id: AtomicI64,
        inserted: Mutex<Vec<ReportPayload>>,
        should_fail: bool,
    }

    impl MockStore {
        fn failing() -> Self {
            Self {
                should_fail: true,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl ReportStore for MockStore {
        async fn insert(&self, payload: &ReportPayload) -> Result<i64, ContractError> {
            if self.should_fail {
                return Err(ContractError::storage_write("mock failure"));
            }
            self.inserted.lock().unwrap().push(payload.clone());
            Ok(self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
        }

        async fn fetch_latest(&self) -> Result<Option<LatestReport>, ContractError> {
            Ok(None)
        }

        async fn fetch_recent(&self, _limit: i64) -> Result<Vec<LocationReport>, ContractError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_all_payloads_persisted() {
        let store = Arc::new(MockStore::default());
        let (tx, rx) = async_channel::bounded(16);
        let supervisor = DispatchSupervisor::spawn(Some(store.clone()), rx, 4);

        for i in 0..10 {
            tx.send(ReportPayload::new(i as f64, -(i as f64), i)).await.unwrap();
        }
        drop(tx);

        supervisor.shutdown().await;
        assert_eq!(store.inserted.lock().unwrap().len(), 10);
    }

    #[tokio::test]
    async fn test_failure_isolation() {
        let store = Arc::new(MockStore::failing());
        let (tx, rx) = async_channel::bounded(16);
        let supervisor = DispatchSupervisor::spawn(Some(store), rx, 2);
        let metrics = supervisor.metrics();

        for i in 0..5 {
            tx.send(ReportPayload::new(1.0, 1.0, i)).await.unwrap();
        }
        drop(tx);

        supervisor.shutdown().await;
        // Every attempt failed, none escaped the worker loop
        assert_eq!(metrics.snapshot().failure_count, 5);
        assert_eq!(metrics.snapshot().persisted_count, 0);
    }

    #[tokio::test]
    async fn test_degraded_mode_drops_without_panic() {
        let (tx, rx) = async_channel::bounded(16);
        let supervisor = DispatchSupervisor::spawn(None, rx, 2);
        let metrics = supervisor.metrics();

        tx.send(ReportPayload::new(1.0, 2.0, 3)).await.unwrap();
        drop(tx);

        supervisor.shutdown().await;
        assert_eq!(metrics.snapshot().failure_count, 1);
    }

    #[tokio::test]
    async fn test_shutdown_drains_queued_payloads() {
        let store = Arc::new(MockStore::default());
        let (tx, rx) = async_channel::bounded(64);

        // Queue payloads before any worker exists, then spawn and shut down
        for i in 0..20 {
            tx.send(ReportPayload::new(0.0, 0.0, i)).await.unwrap();
        }
        let supervisor = DispatchSupervisor::spawn(Some(store.clone()), rx, 3);
        drop(tx);

        supervisor.shutdown().await;
        assert_eq!(store.inserted.lock().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_workers_interleave_without_losing_reports() {
        let store = Arc::new(MockStore::default());
        let (tx, rx) = async_channel::bounded(8);
        let supervisor = DispatchSupervisor::spawn(Some(store.clone()), rx, 4);

        let sender = tokio::spawn(async move {
            for i in 0..50 {
                tx.send(ReportPayload::new(1.0, 1.0, i)).await.unwrap();
                if i % 10 == 0 {
                    sleep(Duration::from_millis(1)).await;
                }
            }
        });
        sender.await.unwrap();

        supervisor.shutdown().await;
        assert_eq!(store.inserted.lock().unwrap().len(), 50);
    }
}
