//! Service lifecycle coordination.

mod coordinator;
mod stats;

pub use coordinator::{Service, ServiceState};
pub use stats::ServiceStats;
