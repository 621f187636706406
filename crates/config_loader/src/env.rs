//! Environment variable parsing
//!
//! Every variable has a documented default except the database credentials;
//! when any of those is absent the database section is omitted entirely.

use std::fmt::Display;
use std::str::FromStr;

use contracts::ContractError;
use tracing::warn;

use crate::{ApiConfig, AppConfig, DatabaseConfig, IngestConfig};

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_POOL_SIZE: u32 = 10;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
const DEFAULT_UDP_PORT: u16 = 5001;
const DEFAULT_HTTP_PORT: u16 = 2000;
const DEFAULT_QUEUE_CAPACITY: usize = 1024;
const DEFAULT_WORKERS: usize = 8;
const DEFAULT_LIMIT: i64 = 100;
const DEFAULT_MAX_LIMIT: i64 = 1000;

/// Build an `AppConfig` from a variable lookup
pub(crate) fn from_lookup(
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<AppConfig, ContractError> {
    Ok(AppConfig {
        database: database_from_lookup(lookup)?,
        ingest: IngestConfig {
            port: parsed(lookup, "UDP_PORT", DEFAULT_UDP_PORT)?,
            queue_capacity: parsed(lookup, "INGEST_QUEUE_CAPACITY", DEFAULT_QUEUE_CAPACITY)?,
            workers: parsed(lookup, "INGEST_WORKERS", DEFAULT_WORKERS)?,
        },
        api: ApiConfig {
            port: parsed(lookup, "HTTP_PORT", DEFAULT_HTTP_PORT)?,
            default_limit: parsed(lookup, "API_DEFAULT_LIMIT", DEFAULT_LIMIT)?,
            max_limit: parsed(lookup, "API_MAX_LIMIT", DEFAULT_MAX_LIMIT)?,
        },
    })
}

fn database_from_lookup(
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<Option<DatabaseConfig>, ContractError> {
    let (name, user, password) = match (lookup("DB_NAME"), lookup("DB_USER"), lookup("DB_PASSWORD"))
    {
        (Some(name), Some(user), Some(password)) => (name, user, password),
        _ => {
            warn!("DB_NAME/DB_USER/DB_PASSWORD not fully set, storage disabled");
            return Ok(None);
        }
    };

    Ok(Some(DatabaseConfig {
        host: lookup("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string()),
        port: parsed(lookup, "DB_PORT", DEFAULT_DB_PORT)?,
        name,
        user,
        password,
        ssl: lookup("DB_SSL")
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(true),
        pool_size: parsed(lookup, "DB_POOL_SIZE", DEFAULT_POOL_SIZE)?,
        acquire_timeout_secs: parsed(
            lookup,
            "DB_ACQUIRE_TIMEOUT_SECS",
            DEFAULT_ACQUIRE_TIMEOUT_SECS,
        )?,
    }))
}

/// Parse a variable, falling back to `default` when absent
fn parsed<T>(
    lookup: &dyn Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ContractError>
where
    T: FromStr,
    T::Err: Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| ContractError::config_parse(format!("{key}='{raw}': {e}"))),
        None => Ok(default),
    }
}
