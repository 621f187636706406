//! Persisted location report entities

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A persisted location report (one row of `location_data`).
///
/// `accuracy`, `altitude`, `speed` and `provider` are reserved for future
/// payload versions and always NULL under the current producer contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    /// Store-assigned surrogate identifier, strictly increasing in commit order
    pub id: i64,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub timestamp_value: Option<i64>,
    pub accuracy: Option<Decimal>,
    pub altitude: Option<Decimal>,
    pub speed: Option<Decimal>,
    pub provider: Option<String>,
    /// Server-assigned insertion timestamp, set once
    pub created_at: NaiveDateTime,
}

/// Projection returned by the latest-fix query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatestReport {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub timestamp_value: Option<i64>,
    pub created_at: NaiveDateTime,
}

impl From<LocationReport> for LatestReport {
    fn from(report: LocationReport) -> Self {
        Self {
            latitude: report.latitude,
            longitude: report.longitude,
            timestamp_value: report.timestamp_value,
            created_at: report.created_at,
        }
    }
}
