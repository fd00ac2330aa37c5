//! # Connections Module
//!
//! This module handles the persistent connection to the external data store:
//! the driver seam, the concrete drivers and the cache that memoizes the
//! first successful connection.

use thiserror::Error;

use crate::configs::config_store::ConfigError;

/// The connect/derive-database contract a store driver fulfils.
pub mod driver;

/// Lazily established, memoized store connection.
pub mod connection_cache;

/// PostgreSQL driver backed by an `sqlx` pool.
pub mod db_postgres;

/// Process-local driver for development and tests.
pub mod memory;

pub use connection_cache::{ConnectionCache, StoreHandles};
pub use driver::{DatabaseHealth, StoreDriver};

/// Custom error types for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store configuration error: {0}")]
    ConfigurationError(#[from] ConfigError),
    #[error("Failed to connect to store: {0}")]
    ConnectionError(String),
    #[error("Query execution failed: {0}")]
    QueryError(String),
}
