//! Decoded ingestion payload
//!
//! Ephemeral key-value payload extracted from one datagram. Lives only for
//! the duration of a single dispatch; never persisted as-is.

use serde::{Deserialize, Serialize};

/// Report payload decoded from one ingestion datagram.
///
/// The producer contract is intentionally permissive: any key may be absent
/// or carry a non-numeric value, in which case the field is `None` and the
/// store decides whether the resulting row is acceptable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    /// Latitude in decimal degrees, [-90, 90]
    pub lat: Option<f64>,
    /// Longitude in decimal degrees, [-180, 180]
    pub lon: Option<f64>,
    /// Producer-supplied epoch time
    pub time: Option<i64>,
}

impl ReportPayload {
    /// Create a fully-populated payload
    pub fn new(lat: f64, lon: f64, time: i64) -> Self {
        Self {
            lat: Some(lat),
            lon: Some(lon),
            time: Some(time),
        }
    }

    /// True when every recognized key is present
    pub fn is_complete(&self) -> bool {
        self.lat.is_some() && self.lon.is_some() && self.time.is_some()
    }
}
