//! Row types mapping `location_data` columns onto contract entities

use chrono::NaiveDateTime;
use contracts::{LatestReport, LocationReport};
use rust_decimal::Decimal;
use sqlx::FromRow;

#[derive(Debug, FromRow)]
pub(crate) struct LocationRow {
    pub id: i64,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub timestamp_value: Option<i64>,
    pub accuracy: Option<Decimal>,
    pub altitude: Option<Decimal>,
    pub speed: Option<Decimal>,
    pub provider: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

#[derive(Debug, FromRow)]
pub(crate) struct LatestRow {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub timestamp_value: Option<i64>,
    pub created_at: Option<NaiveDateTime>,
}

impl From<LocationRow> for LocationReport {
    fn from(row: LocationRow) -> Self {
        Self {
            id: row.id,
            latitude: row.latitude,
            longitude: row.longitude,
            timestamp_value: row.timestamp_value,
            accuracy: row.accuracy,
            altitude: row.altitude,
            speed: row.speed,
            provider: row.provider,
            created_at: row.created_at.unwrap_or_default(),
        }
    }
}

impl From<LatestRow> for LatestReport {
    fn from(row: LatestRow) -> Self {
        Self {
            latitude: row.latitude,
            longitude: row.longitude,
            timestamp_value: row.timestamp_value,
            created_at: row.created_at.unwrap_or_default(),
        }
    }
}
