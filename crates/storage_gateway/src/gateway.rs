//! StorageGateway - pooled connection owner and `ReportStore` implementation

use std::time::Duration;

use async_trait::async_trait;
use config_loader::DatabaseConfig;
use contracts::{ContractError, LatestReport, LocationReport, ReportPayload, ReportStore};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgSslMode};
use tracing::{debug, info, instrument};

use crate::models::{LatestRow, LocationRow};
use crate::schema::{CREATE_TABLE_SQL, INSERT_REPORT_SQL, SELECT_LATEST_SQL, SELECT_RECENT_SQL};

/// Gateway over the location report store.
///
/// Holds the only shared mutable resource between the ingestion and query
/// paths: a fixed-size pool of reusable connections. Every operation checks
/// out one connection for its duration and releases it on all exit paths.
#[derive(Clone)]
pub struct StorageGateway {
    pool: PgPool,
}

impl StorageGateway {
    /// Construct the pool and verify the store is reachable.
    ///
    /// # Errors
    /// `StorageUnavailable` when no connection can be established; the
    /// caller is expected to continue in degraded mode.
    #[instrument(
        name = "storage_gateway_connect",
        skip(config),
        fields(host = %config.host, port = config.port, pool_size = config.pool_size)
    )]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, ContractError> {
        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.name)
            .username(&config.user)
            .password(&config.password)
            .ssl_mode(if config.ssl {
                PgSslMode::Require
            } else {
                PgSslMode::Prefer
            });

        let pool = PgPoolOptions::new()
            .max_connections(config.pool_size)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect_with(options)
            .await
            .map_err(|e| ContractError::storage_unavailable(e.to_string()))?;

        info!(pool_size = config.pool_size, "connection pool created");

        Ok(Self { pool })
    }

    /// Create the `location_data` table if absent.
    ///
    /// Idempotent; run on every process start.
    #[instrument(name = "storage_gateway_initialize", skip(self))]
    pub async fn initialize(&self) -> Result<(), ContractError> {
        sqlx::query(CREATE_TABLE_SQL)
            .execute(&self.pool)
            .await
            .map_err(|e| ContractError::storage_unavailable(e.to_string()))?;
        info!("location_data table verified");
        Ok(())
    }

    /// Close the pool, releasing all connections.
    ///
    /// No persistence operation may begin afterwards.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("connection pool closed");
    }
}

#[async_trait]
impl ReportStore for StorageGateway {
    async fn insert(&self, payload: &ReportPayload) -> Result<i64, ContractError> {
        let latitude = payload.lat.and_then(Decimal::from_f64);
        let longitude = payload.lon.and_then(Decimal::from_f64);

        let (id,): (i64,) = sqlx::query_as(INSERT_REPORT_SQL)
            .bind(latitude)
            .bind(longitude)
            .bind(payload.time)
            .fetch_one(&self.pool)
            .await
            .map_err(write_error)?;

        debug!(id, "report inserted");
        Ok(id)
    }

    async fn fetch_latest(&self) -> Result<Option<LatestReport>, ContractError> {
        let row: Option<LatestRow> = sqlx::query_as(SELECT_LATEST_SQL)
            .fetch_optional(&self.pool)
            .await
            .map_err(read_error)?;

        Ok(row.map(LatestReport::from))
    }

    async fn fetch_recent(&self, limit: i64) -> Result<Vec<LocationReport>, ContractError> {
        let rows: Vec<LocationRow> = sqlx::query_as(SELECT_RECENT_SQL)
            .bind(limit)
            .fetch_all(&self.pool)
            .await
            .map_err(read_error)?;

        Ok(rows.into_iter().map(LocationReport::from).collect())
    }
}

/// Map a write-path error onto the contract taxonomy.
///
/// Pool exhaustion and transport loss read as unavailability; anything else
/// (constraint violation first among them) is a write error the caller
/// drops and logs.
fn write_error(error: sqlx::Error) -> ContractError {
    match error {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            ContractError::storage_unavailable(error.to_string())
        }
        other => ContractError::storage_write(other.to_string()),
    }
}

/// Query-path errors all surface as unavailability to the caller.
fn read_error(error: sqlx::Error) -> ContractError {
    ContractError::storage_unavailable(error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_error_classification() {
        let err = write_error(sqlx::Error::PoolTimedOut);
        assert!(err.is_unavailable());

        let err = write_error(sqlx::Error::RowNotFound);
        assert!(!err.is_unavailable());
        assert!(matches!(err, ContractError::StorageWrite { .. }));
    }

    #[test]
    fn test_read_errors_surface_as_unavailable() {
        assert!(read_error(sqlx::Error::RowNotFound).is_unavailable());
    }

    #[test]
    fn test_coordinate_decimal_conversion() {
        let payload = ReportPayload::new(40.7128, -74.0060, 1_700_000_000);
        let latitude = payload.lat.and_then(Decimal::from_f64).unwrap();
        assert_eq!(latitude.to_string(), "40.7128");

        let absent: Option<f64> = None;
        assert!(absent.and_then(Decimal::from_f64).is_none());
    }
}
