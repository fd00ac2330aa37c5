//! # PostgreSQL Store Driver
//!
//! Opens the store connection as an `sqlx` PostgreSQL pool and scopes the
//! logical database handle to it. Supports health checks on the derived
//! database handle.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

use super::driver::{DatabaseHealth, StoreDriver};
use super::StoreError;

/// Driver settings applied when the pool is first opened.
#[derive(Debug, Clone)]
pub struct PostgresDriver {
    max_connections: u32,
    acquire_timeout: Duration,
}

impl Default for PostgresDriver {
    fn default() -> Self {
        Self::new(5, Duration::from_secs(3))
    }
}

impl PostgresDriver {
    /// # Arguments
    /// * `max_connections` - Maximum number of concurrent connections in the pool.
    /// * `acquire_timeout` - How long to wait for a pooled connection.
    pub fn new(max_connections: u32, acquire_timeout: Duration) -> Self {
        Self {
            max_connections,
            acquire_timeout,
        }
    }

    pub fn max_connections(&self) -> u32 {
        self.max_connections
    }

    pub fn acquire_timeout(&self) -> Duration {
        self.acquire_timeout
    }
}

#[async_trait]
impl StoreDriver for PostgresDriver {
    type Connection = PgPool;
    type Database = PgDatabase;

    async fn connect(&self, address: &str) -> Result<PgPool, StoreError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(address)
            .await
            .map_err(|e: sqlx::Error| StoreError::ConnectionError(e.to_string()))
    }

    fn database(&self, connection: &PgPool, name: &str) -> PgDatabase {
        PgDatabase {
            pool: connection.clone(),
            name: name.to_string(),
        }
    }
}

/// A logical database on an open PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgDatabase {
    pool: PgPool,
    name: String,
}

impl PgDatabase {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The underlying pool, for running queries.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl DatabaseHealth for PgDatabase {
    fn database_name(&self) -> &str {
        &self.name
    }

    /// Checks the health of the database connection by running a simple query.
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e: sqlx::Error| StoreError::QueryError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_pool_settings() {
        let driver = PostgresDriver::default();
        assert_eq!(driver.max_connections(), 5);
        assert_eq!(driver.acquire_timeout(), Duration::from_secs(3));
    }

    #[tokio::test]
    async fn malformed_address_is_a_connection_error() {
        let driver = PostgresDriver::new(1, Duration::from_millis(200));
        let err = driver.connect("not a postgres url").await.unwrap_err();
        assert!(matches!(err, StoreError::ConnectionError(_)));
    }
}
