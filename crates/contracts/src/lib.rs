//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - `timestamp_value` is the producer-supplied epoch time, never validated
//!   against the server clock
//! - `created_at` is assigned by the store at insertion time

mod error;
mod payload;
mod report;
mod store;

pub use error::*;
pub use payload::ReportPayload;
pub use report::{LatestReport, LocationReport};
pub use store::ReportStore;
