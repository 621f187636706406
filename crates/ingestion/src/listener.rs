//! IngestListener - UDP receive loop
//!
//! The loop performs no I/O besides the socket itself: decoded payloads are
//! handed to the dispatch queue with `try_send`, so a slow store can never
//! stall the next receive. The protocol is fire-and-forget in both
//! directions; there is no acknowledgment back to the sender.

use std::net::SocketAddr;
use std::sync::Arc;

use async_channel::{Sender, TrySendError};
use contracts::{ContractError, ReportPayload};
use metrics::counter;
use tokio::net::UdpSocket;
use tokio::task::JoinHandle;
use tracing::{info, instrument, warn};

use crate::decode::decode_datagram;
use crate::metrics::ListenerMetrics;

/// Largest datagram the listener will read; reports are a few dozen bytes.
const MAX_DATAGRAM_SIZE: usize = 2048;

/// UDP ingestion listener bound on all interfaces.
pub struct IngestListener {
    socket: UdpSocket,
    tx: Sender<ReportPayload>,
    metrics: Arc<ListenerMetrics>,
}

impl IngestListener {
    /// Bind the ingestion endpoint.
    ///
    /// Port 0 binds an ephemeral port; `local_addr` reports the actual one.
    ///
    /// # Errors
    /// Bind failure is fatal to startup, unlike everything that happens
    /// after it.
    pub async fn bind(port: u16, tx: Sender<ReportPayload>) -> Result<Self, ContractError> {
        let socket = UdpSocket::bind(("0.0.0.0", port)).await?;
        info!(addr = %socket.local_addr()?, "UDP listener bound");

        Ok(Self {
            socket,
            tx,
            metrics: Arc::new(ListenerMetrics::new()),
        })
    }

    /// Address the socket is bound to
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Shared receive-loop metrics
    pub fn metrics(&self) -> Arc<ListenerMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Run the receive loop until the dispatch queue closes.
    ///
    /// Malformed datagrams are logged and dropped; no error produced by one
    /// message ever reaches the next receive.
    #[instrument(name = "ingest_listener_run", skip(self))]
    pub async fn run(self) {
        let mut buf = [0u8; MAX_DATAGRAM_SIZE];

        info!("UDP listener started");

        loop {
            let (len, peer) = match self.socket.recv_from(&mut buf).await {
                Ok(received) => received,
                Err(e) => {
                    warn!(error = %e, "datagram receive failed");
                    continue;
                }
            };

            self.metrics.record_received();
            counter!("geotrack_datagrams_received_total").increment(1);

            let payload = match decode_datagram(&buf[..len]) {
                Ok(payload) => payload,
                Err(e) => {
                    self.metrics.record_decode_failure();
                    counter!("geotrack_decode_failures_total").increment(1);
                    warn!(peer = %peer, error = %e, "dropping undecodable datagram");
                    continue;
                }
            };

            match self.tx.try_send(payload) {
                Ok(()) => {}
                Err(TrySendError::Full(_)) => {
                    self.metrics.record_queue_dropped();
                    counter!("geotrack_queue_dropped_total").increment(1);
                    warn!(peer = %peer, "dispatch queue full, report dropped");
                }
                Err(TrySendError::Closed(_)) => {
                    info!("dispatch queue closed, listener exiting");
                    break;
                }
            }
        }
    }

    /// Spawn the receive loop as a background task.
    ///
    /// The task is cancelled cooperatively with `abort()`; `recv_from` is
    /// cancel-safe and the socket is released when the task drops.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            self.run().await;
        })
    }
}
