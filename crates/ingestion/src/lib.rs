//! # Ingestion
//!
//! Connectionless report ingestion.
//!
//! Responsibilities:
//! - Bind a single UDP endpoint on all interfaces
//! - Decode each datagram into a `ReportPayload`
//! - Hand decoded payloads to the dispatch queue without ever blocking
//!   the receive loop

mod decode;
mod listener;
mod metrics;

pub use decode::decode_datagram;
pub use listener::IngestListener;
pub use metrics::{ListenerMetrics, ListenerSnapshot};
