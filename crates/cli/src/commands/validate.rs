//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    udp_port: u16,
    http_port: u16,
    workers: usize,
    queue_capacity: usize,
    default_limit: i64,
    max_limit: i64,
    storage_configured: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!("Validating environment configuration");

    let result = validate_config();

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config() -> ValidationResult {
    match config_loader::ConfigLoader::load_from_env() {
        Ok(config) => {
            let warnings = collect_warnings(&config);

            ValidationResult {
                valid: true,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    udp_port: config.ingest.port,
                    http_port: config.api.port,
                    workers: config.ingest.workers,
                    queue_capacity: config.ingest.queue_capacity,
                    default_limit: config.api.default_limit,
                    max_limit: config.api.max_limit,
                    storage_configured: config.database.is_some(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(config: &config_loader::AppConfig) -> Vec<String> {
    let mut warnings = Vec::new();

    match &config.database {
        None => warnings.push(
            "DB_NAME/DB_USER/DB_PASSWORD not fully set - service will run degraded".to_string(),
        ),
        Some(db) => {
            if !db.ssl {
                warnings.push("DB_SSL=false - store connection will not require TLS".to_string());
            }
            if (config.ingest.workers as u32) > db.pool_size {
                warnings.push(format!(
                    "INGEST_WORKERS ({}) exceeds DB_POOL_SIZE ({}) - workers will wait on the pool",
                    config.ingest.workers, db.pool_size
                ));
            }
        }
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid");

        if let Some(ref summary) = result.summary {
            println!("\n  UDP port: {}", summary.udp_port);
            println!("  HTTP port: {}", summary.http_port);
            println!("  Workers: {}", summary.workers);
            println!("  Queue capacity: {}", summary.queue_capacity);
            println!(
                "  Limits: default {}, max {}",
                summary.default_limit, summary.max_limit
            );
            println!("  Storage configured: {}", summary.storage_configured);
        }

        if let Some(ref warnings) = result.warnings {
            println!();
            for warning in warnings {
                println!("  ⚠ {}", warning);
            }
        }
    } else if let Some(ref error) = result.error {
        println!("✗ Configuration is invalid: {}", error);
    }
}
