//! # Dispatcher
//!
//! Bounded persistence fan-out.
//!
//! Responsibilities:
//! - Consume decoded `ReportPayload`s from the shared queue
//! - Persist each through the Storage Gateway on a fixed pool of workers
//! - Isolate per-report failures from the listener and from each other

mod metrics;
mod supervisor;

pub use metrics::{DispatchMetrics, DispatchSnapshot};
pub use supervisor::DispatchSupervisor;
