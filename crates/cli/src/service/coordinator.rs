//! Service coordinator - brings components up and down in dependency order.
//!
//! Startup: pool → schema → dispatch workers → UDP listener → HTTP server.
//! A missing or unreachable store does not prevent startup; the service
//! enters degraded mode and storage-backed operations report unavailability.
//! Shutdown reverses the order: the listener is cancelled first so no new
//! messages arrive, the dispatch queue drains, and only then does the pool
//! close.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use config_loader::AppConfig;
use contracts::ReportStore;
use dispatcher::{DispatchSnapshot, DispatchSupervisor};
use ingestion::{IngestListener, ListenerMetrics};
use query_api::{create_router, AppState};
use storage_gateway::StorageGateway;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::stats::ServiceStats;

/// Lifecycle states, transitioned in order on start and stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Owner of every running component and the only holder of the pool handle.
pub struct Service {
    config: AppConfig,
    state: ServiceState,
    gateway: Option<StorageGateway>,
    supervisor: Option<DispatchSupervisor>,
    listener_task: Option<JoinHandle<()>>,
    listener_metrics: Option<Arc<ListenerMetrics>>,
    http_task: Option<JoinHandle<()>>,
    ingest_addr: Option<std::net::SocketAddr>,
    dispatch_snapshot: DispatchSnapshot,
    started_at: Option<Instant>,
}

impl Service {
    /// Create a stopped service from configuration
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            state: ServiceState::Stopped,
            gateway: None,
            supervisor: None,
            listener_task: None,
            listener_metrics: None,
            http_task: None,
            ingest_addr: None,
            dispatch_snapshot: DispatchSnapshot::default(),
            started_at: None,
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> ServiceState {
        self.state
    }

    /// UDP address the listener is bound to (None before start)
    pub fn ingest_addr(&self) -> Option<std::net::SocketAddr> {
        self.ingest_addr
    }

    /// Bring all components up in dependency order.
    ///
    /// # Errors
    /// Only listener/server bind failures abort startup; storage failures
    /// degrade it.
    pub async fn start(&mut self) -> Result<()> {
        self.transition(ServiceState::Starting);
        self.started_at = Some(Instant::now());

        // Storage: degraded mode on any failure
        self.gateway = self.connect_storage().await;
        let store: Option<Arc<dyn ReportStore>> = self
            .gateway
            .clone()
            .map(|gateway| Arc::new(gateway) as Arc<dyn ReportStore>);

        // Dispatch workers share one bounded queue with the listener
        let (tx, rx) = async_channel::bounded(self.config.ingest.queue_capacity);
        self.supervisor = Some(DispatchSupervisor::spawn(
            store.clone(),
            rx,
            self.config.ingest.workers,
        ));

        // Ingestion listener
        let listener = IngestListener::bind(self.config.ingest.port, tx)
            .await
            .context("Failed to bind UDP listener")?;
        self.ingest_addr = listener.local_addr().ok();
        self.listener_metrics = Some(listener.metrics());
        self.listener_task = Some(listener.spawn());

        // Query API
        let router = create_router(AppState {
            store,
            default_limit: self.config.api.default_limit,
            max_limit: self.config.api.max_limit,
        });
        let http_listener = tokio::net::TcpListener::bind(("0.0.0.0", self.config.api.port))
            .await
            .context("Failed to bind HTTP listener")?;
        info!(addr = %http_listener.local_addr()?, "query API listening");
        self.http_task = Some(tokio::spawn(async move {
            if let Err(e) = axum::serve(http_listener, router).await {
                error!(error = %e, "query API server failed");
            }
        }));

        self.transition(ServiceState::Running);
        Ok(())
    }

    /// Tear components down in reverse order and collect run statistics.
    pub async fn stop(&mut self) -> ServiceStats {
        self.transition(ServiceState::Stopping);

        // Listener first: no new messages, and dropping it closes the
        // dispatch queue so the workers drain what is left
        if let Some(task) = self.listener_task.take() {
            task.abort();
            let _ = task.await;
        }

        if let Some(supervisor) = self.supervisor.take() {
            let dispatch = supervisor.metrics();
            supervisor.shutdown().await;
            self.dispatch_snapshot = dispatch.snapshot();
        }

        if let Some(task) = self.http_task.take() {
            task.abort();
            let _ = task.await;
        }

        // Pool closes last; no persistence may begin afterwards
        if let Some(gateway) = self.gateway.take() {
            gateway.close().await;
        }

        self.transition(ServiceState::Stopped);
        self.collect_stats()
    }

    async fn connect_storage(&self) -> Option<StorageGateway> {
        let Some(db_config) = &self.config.database else {
            warn!("no database configuration, starting in degraded mode");
            return None;
        };

        let gateway = match StorageGateway::connect(db_config).await {
            Ok(gateway) => gateway,
            Err(e) => {
                warn!(error = %e, "store unreachable, starting in degraded mode");
                return None;
            }
        };

        match gateway.initialize().await {
            Ok(()) => Some(gateway),
            Err(e) => {
                warn!(error = %e, "schema initialization failed, starting in degraded mode");
                gateway.close().await;
                None
            }
        }
    }

    fn collect_stats(&self) -> ServiceStats {
        let listener = self
            .listener_metrics
            .as_ref()
            .map(|m| m.snapshot())
            .unwrap_or_default();

        ServiceStats {
            datagrams_received: listener.datagrams_received,
            decode_failures: listener.decode_failures,
            queue_dropped: listener.queue_dropped,
            reports_persisted: self.dispatch_snapshot.persisted_count,
            persist_failures: self.dispatch_snapshot.failure_count,
            duration: self.started_at.map(|t| t.elapsed()).unwrap_or_default(),
        }
    }

    fn transition(&mut self, next: ServiceState) {
        info!(from = ?self.state, to = ?next, "lifecycle transition");
        self.state = next;
    }
}
