//! Listener metrics

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for the receive loop
#[derive(Debug, Default)]
pub struct ListenerMetrics {
    /// Total datagrams received
    pub datagrams_received: AtomicU64,
    /// Datagrams dropped by the decode stage
    pub decode_failures: AtomicU64,
    /// Decoded payloads dropped because the dispatch queue was full
    pub queue_dropped: AtomicU64,
}

impl ListenerMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Record datagram received
    pub fn record_received(&self) {
        self.datagrams_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Record decode failure
    pub fn record_decode_failure(&self) {
        self.decode_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record payload dropped on a full queue
    pub fn record_queue_dropped(&self) {
        self.queue_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> ListenerSnapshot {
        ListenerSnapshot {
            datagrams_received: self.datagrams_received.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            queue_dropped: self.queue_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Metrics snapshot
#[derive(Debug, Clone, Copy, Default)]
pub struct ListenerSnapshot {
    pub datagrams_received: u64,
    pub decode_failures: u64,
    pub queue_dropped: u64,
}
