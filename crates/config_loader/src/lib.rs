//! # Config Loader
//!
//! Environment-driven configuration module.
//!
//! Responsibilities:
//! - Read process configuration from environment variables
//! - Apply documented defaults
//! - Validate configuration legality
//! - Generate `AppConfig`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//!
//! let config = ConfigLoader::load_from_env().unwrap();
//! println!("UDP port: {}", config.ingest.port);
//! ```

mod env;
mod validator;

use contracts::ContractError;
use serde::Serialize;

/// Database connection settings.
///
/// All of `DB_NAME`, `DB_USER` and `DB_PASSWORD` must be present for the
/// storage gateway to be constructed; otherwise the process runs degraded.
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    /// Store host (`DB_HOST`, default "localhost")
    pub host: String,
    /// Store port (`DB_PORT`, default 5432)
    pub port: u16,
    /// Database name (`DB_NAME`)
    pub name: String,
    /// User (`DB_USER`)
    pub user: String,
    /// Password (`DB_PASSWORD`)
    #[serde(skip_serializing)]
    pub password: String,
    /// Require TLS (`DB_SSL`, default true)
    pub ssl: bool,
    /// Max pooled connections (`DB_POOL_SIZE`, default 10)
    pub pool_size: u32,
    /// Bounded pool acquire wait (`DB_ACQUIRE_TIMEOUT_SECS`, default 5)
    pub acquire_timeout_secs: u64,
}

/// Ingestion listener settings.
#[derive(Debug, Clone, Serialize)]
pub struct IngestConfig {
    /// UDP port bound on all interfaces (`UDP_PORT`, default 5001)
    pub port: u16,
    /// Dispatch queue bound (`INGEST_QUEUE_CAPACITY`, default 1024)
    pub queue_capacity: usize,
    /// Persist worker count (`INGEST_WORKERS`, default 8)
    pub workers: usize,
}

/// Query API settings.
#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    /// HTTP port (`HTTP_PORT`, default 2000)
    pub port: u16,
    /// Default `limit` for the recent-reports query (`API_DEFAULT_LIMIT`, default 100)
    pub default_limit: i64,
    /// Server-side cap on `limit` (`API_MAX_LIMIT`, default 1000)
    pub max_limit: i64,
}

/// Complete process configuration.
#[derive(Debug, Clone, Serialize)]
pub struct AppConfig {
    /// Absent when the required database variables are not set; the process
    /// then starts in degraded mode rather than aborting.
    pub database: Option<DatabaseConfig>,
    pub ingest: IngestConfig,
    pub api: ApiConfig,
}

/// Configuration loader
///
/// Provides static methods to load configuration from the process
/// environment or from an injected variable lookup (for tests).
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from the process environment
    ///
    /// # Errors
    /// - Malformed variable value (non-numeric port, etc.)
    /// - Validation failure
    pub fn load_from_env() -> Result<AppConfig, ContractError> {
        Self::load_from_lookup(&|key| std::env::var(key).ok())
    }

    /// Load configuration from a variable lookup function
    ///
    /// # Errors
    /// - Malformed variable value
    /// - Validation failure
    pub fn load_from_lookup(
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Result<AppConfig, ContractError> {
        let config = env::from_lookup(lookup)?;
        validator::validate(&config)?;
        Ok(config)
    }
}
