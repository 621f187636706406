//! ReportStore trait - Storage Gateway interface
//!
//! Defines the abstract persistence interface shared by the ingestion and
//! query paths. The pool of store connections is the only resource the two
//! paths share.

use async_trait::async_trait;

use crate::{ContractError, LatestReport, LocationReport, ReportPayload};

/// Persistence operations over the location report store.
///
/// Every operation acquires one pooled connection for its duration and
/// releases it on all exit paths.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Insert a single report, returning the store-assigned id.
    ///
    /// # Errors
    /// `StorageWrite` on constraint violation, `StorageUnavailable` when no
    /// connection can be acquired within the pool's wait bound.
    async fn insert(&self, payload: &ReportPayload) -> Result<i64, ContractError>;

    /// Fetch the report with the greatest id, or `None` if the table is empty.
    async fn fetch_latest(&self) -> Result<Option<LatestReport>, ContractError>;

    /// Fetch up to `limit` reports ordered by id descending.
    ///
    /// `limit` must be positive; callers are expected to clamp it.
    async fn fetch_recent(&self, limit: i64) -> Result<Vec<LocationReport>, ContractError>;
}
