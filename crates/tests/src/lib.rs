//! # Integration Tests
//!
//! End-to-end tests for the full ingestion path: UDP datagram in,
//! persisted report out, and the HTTP query surface on top.

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        let payload = contracts::ReportPayload::new(1.0, 2.0, 3);
        assert!(payload.is_complete());
    }

    #[test]
    fn test_empty_environment_yields_degraded_defaults() {
        let config = config_loader::ConfigLoader::load_from_lookup(&|_| None).unwrap();
        assert!(config.database.is_none());
        assert_eq!(config.ingest.port, 5001);
        assert_eq!(config.api.port, 2000);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use chrono::Utc;
    use contracts::{ContractError, LatestReport, LocationReport, ReportPayload, ReportStore};
    use dispatcher::DispatchSupervisor;
    use ingestion::IngestListener;
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal::Decimal;
    use tokio::net::UdpSocket;
    use tokio::sync::Mutex;

    /// In-memory store that enforces the same NOT NULL constraints as
    /// the real table: a payload without lat and lon is rejected.
    struct MemoryStore {
        next_id: AtomicI64,
        rows: Mutex<Vec<LocationReport>>,
    }

    impl MemoryStore {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                next_id: AtomicI64::new(1),
                rows: Mutex::new(Vec::new()),
            })
        }

        async fn row_count(&self) -> usize {
            self.rows.lock().await.len()
        }
    }

    #[async_trait]
    impl ReportStore for MemoryStore {
        async fn insert(&self, payload: &ReportPayload) -> Result<i64, ContractError> {
            let lat = payload
                .lat
                .and_then(Decimal::from_f64)
                .ok_or_else(|| ContractError::storage_write("null value in column \"latitude\""))?;
            let lon = payload
                .lon
                .and_then(Decimal::from_f64)
                .ok_or_else(|| ContractError::storage_write("null value in column \"longitude\""))?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.rows.lock().await.push(LocationReport {
                id,
                latitude: lat,
                longitude: lon,
                timestamp_value: payload.time,
                accuracy: None,
                altitude: None,
                speed: None,
                provider: None,
                created_at: Utc::now().naive_utc(),
            });
            Ok(id)
        }

        async fn fetch_latest(&self) -> Result<Option<LatestReport>, ContractError> {
            let rows = self.rows.lock().await;
            Ok(rows.last().cloned().map(LatestReport::from))
        }

        async fn fetch_recent(&self, limit: i64) -> Result<Vec<LocationReport>, ContractError> {
            let rows = self.rows.lock().await;
            let mut out: Vec<_> = rows.iter().rev().take(limit as usize).cloned().collect();
            out.sort_by(|a, b| b.id.cmp(&a.id));
            Ok(out)
        }
    }

    struct Stack {
        addr: SocketAddr,
        store: Arc<MemoryStore>,
        supervisor: DispatchSupervisor,
        listener_task: tokio::task::JoinHandle<()>,
    }

    /// Wires the real listener and supervisor together over an
    /// ephemeral UDP port, backed by the in-memory store.
    async fn start_stack(workers: usize) -> Stack {
        let store = MemoryStore::new();
        let (tx, rx) = async_channel::bounded::<ReportPayload>(256);
        let supervisor = DispatchSupervisor::spawn(
            Some(store.clone() as Arc<dyn ReportStore>),
            rx,
            workers,
        );
        let listener = IngestListener::bind(0, tx).await.expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let listener_task = listener.spawn();
        Stack {
            addr,
            store,
            supervisor,
            listener_task,
        }
    }

    async fn send_datagram(target: SocketAddr, body: &str) {
        let sock = UdpSocket::bind("127.0.0.1:0").await.expect("bind sender");
        sock.send_to(body.as_bytes(), target).await.expect("send");
    }

    async fn wait_for_rows(store: &MemoryStore, expected: usize) {
        for _ in 0..200 {
            if store.row_count().await >= expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!(
            "expected {} rows, got {}",
            expected,
            store.row_count().await
        );
    }

    #[tokio::test]
    async fn test_e2e_datagram_to_store() {
        let stack = start_stack(2).await;

        send_datagram(
            stack.addr,
            r#"{"lat": 52.520008, "lon": 13.404954, "time": 1700000000}"#,
        )
        .await;
        wait_for_rows(&stack.store, 1).await;

        let rows = stack.store.rows.lock().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, 1);
        assert_eq!(rows[0].latitude, Decimal::from_f64(52.520008).unwrap());
        assert_eq!(rows[0].longitude, Decimal::from_f64(13.404954).unwrap());
        assert_eq!(rows[0].timestamp_value, Some(1700000000));
        drop(rows);

        stack.listener_task.abort();
        stack.supervisor.shutdown().await;
    }

    #[tokio::test]
    async fn test_e2e_malformed_between_valid() {
        let stack = start_stack(2).await;

        send_datagram(stack.addr, r#"{"lat": 1.0, "lon": 2.0, "time": 10}"#).await;
        wait_for_rows(&stack.store, 1).await;
        send_datagram(stack.addr, "this is not json").await;
        send_datagram(stack.addr, r#"[1, 2, 3]"#).await;
        send_datagram(stack.addr, r#"{"lat": 3.0, "lon": 4.0, "time": 20}"#).await;
        wait_for_rows(&stack.store, 2).await;

        // The malformed datagrams were dropped without taking the
        // listener or a worker down.
        assert_eq!(stack.store.row_count().await, 2);
        let metrics = stack.supervisor.metrics();
        for _ in 0..50 {
            if metrics.snapshot().persisted_count == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(metrics.snapshot().persisted_count, 2);

        stack.listener_task.abort();
        stack.supervisor.shutdown().await;
    }

    #[tokio::test]
    async fn test_e2e_incomplete_payload_fails_at_store() {
        let stack = start_stack(1).await;

        // Decodes fine but violates the NOT NULL latitude column.
        send_datagram(stack.addr, r#"{"lon": 2.0, "time": 10}"#).await;

        for _ in 0..50 {
            if stack.supervisor.metrics().snapshot().failure_count >= 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(stack.store.row_count().await, 0);
        assert_eq!(stack.supervisor.metrics().snapshot().failure_count, 1);

        stack.listener_task.abort();
        stack.supervisor.shutdown().await;
    }

    #[tokio::test]
    async fn test_e2e_concurrent_senders_persist_all() {
        let stack = start_stack(4).await;
        let count = 50;

        let mut senders = Vec::new();
        for i in 0..count {
            let addr = stack.addr;
            senders.push(tokio::spawn(async move {
                let body = format!(r#"{{"lat": {}.5, "lon": 0.25, "time": {}}}"#, i, i);
                let sock = UdpSocket::bind("127.0.0.1:0").await.expect("bind sender");
                sock.send_to(body.as_bytes(), addr).await.expect("send");
            }));
        }
        for handle in senders {
            handle.await.expect("sender task");
        }
        wait_for_rows(&stack.store, count).await;

        let rows = stack.store.rows.lock().await;
        assert_eq!(rows.len(), count);
        let mut ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count, "ids must be distinct");
        drop(rows);

        stack.listener_task.abort();
        stack.supervisor.shutdown().await;
    }

    #[tokio::test]
    async fn test_e2e_query_reflects_ingested_report() {
        let stack = start_stack(2).await;

        send_datagram(
            stack.addr,
            r#"{"lat": -33.865143, "lon": 151.209900, "time": 1700000001}"#,
        )
        .await;
        wait_for_rows(&stack.store, 1).await;

        let state = query_api::AppState {
            store: Some(stack.store.clone() as Arc<dyn ReportStore>),
            default_limit: 100,
            max_limit: 1000,
        };
        let router = query_api::create_router(state);
        let http = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind http");
        let http_addr = http.local_addr().expect("http addr");
        tokio::spawn(async move {
            axum::serve(http, router).await.ok();
        });

        let body: serde_json::Value =
            reqwest::get(format!("http://{}/api/location/latest", http_addr))
                .await
                .expect("request")
                .json()
                .await
                .expect("json body");
        assert!((body["latitude"].as_f64().unwrap() - (-33.865143)).abs() < 1e-6);
        assert!((body["longitude"].as_f64().unwrap() - 151.209900).abs() < 1e-6);
        assert_eq!(body["timestamp_value"].as_i64(), Some(1700000001));

        stack.listener_task.abort();
        stack.supervisor.shutdown().await;
    }
}
