//! Configuration validation
//!
//! Validation rules:
//! - ingest/api ports are non-zero
//! - worker count and queue capacity are positive
//! - pool size and acquire timeout are positive
//! - 1 <= default_limit <= max_limit

use contracts::ContractError;

use crate::AppConfig;

/// Validate an `AppConfig`
///
/// Returns the first error encountered, or Ok(()).
pub(crate) fn validate(config: &AppConfig) -> Result<(), ContractError> {
    validate_ingest(config)?;
    validate_api(config)?;
    validate_database(config)?;
    Ok(())
}

fn validate_ingest(config: &AppConfig) -> Result<(), ContractError> {
    if config.ingest.port == 0 {
        return Err(ContractError::config_validation(
            "ingest.port",
            "must be non-zero",
        ));
    }
    if config.ingest.queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "ingest.queue_capacity",
            "must be > 0",
        ));
    }
    if config.ingest.workers == 0 {
        return Err(ContractError::config_validation(
            "ingest.workers",
            "must be > 0",
        ));
    }
    Ok(())
}

fn validate_api(config: &AppConfig) -> Result<(), ContractError> {
    if config.api.port == 0 {
        return Err(ContractError::config_validation(
            "api.port",
            "must be non-zero",
        ));
    }
    if config.api.default_limit < 1 {
        return Err(ContractError::config_validation(
            "api.default_limit",
            format!("must be >= 1, got {}", config.api.default_limit),
        ));
    }
    if config.api.max_limit < config.api.default_limit {
        return Err(ContractError::config_validation(
            "api.max_limit",
            format!(
                "must be >= default_limit ({}), got {}",
                config.api.default_limit, config.api.max_limit
            ),
        ));
    }
    Ok(())
}

fn validate_database(config: &AppConfig) -> Result<(), ContractError> {
    let Some(db) = &config.database else {
        return Ok(());
    };
    if db.pool_size == 0 {
        return Err(ContractError::config_validation(
            "database.pool_size",
            "must be > 0",
        ));
    }
    if db.acquire_timeout_secs == 0 {
        return Err(ContractError::config_validation(
            "database.acquire_timeout_secs",
            "must be > 0",
        ));
    }
    Ok(())
}
