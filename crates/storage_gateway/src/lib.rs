//! # Storage Gateway
//!
//! Pooled PostgreSQL persistence for location reports.
//!
//! Responsibilities:
//! - Own the fixed-size connection pool shared by ingestion and queries
//! - Idempotent schema initialization
//! - Single-row insert, latest fetch, bounded recent fetch

mod gateway;
mod models;
mod schema;

pub use gateway::StorageGateway;
pub use schema::CREATE_TABLE_SQL;
