//! # Connection Cache
//!
//! Lazily opens the store connection on first use and hands the same
//! connection/database pair to every later caller.
//!
//! The cache is an ordinary value owned by whoever composes the application
//! (usually wrapped in an `Arc` and passed to request handlers). Its slot is a
//! [`tokio::sync::OnceCell`]:
//!
//! - once populated, [`ConnectionCache::acquire`] is a plain memory read;
//! - concurrent first-time callers queue on the cell, so only one connect is
//!   in flight at a time and only the first successful one is kept;
//! - configuration and connection failures leave the cell empty, so the next
//!   call starts over.

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use super::driver::StoreDriver;
use super::StoreError;
use crate::configs::config_store::{redact_address, ConfigSource, StoreConfig};

/// The memoized (connection, database) pair.
pub struct StoreHandles<D: StoreDriver> {
    connection: D::Connection,
    database: D::Database,
}

impl<D: StoreDriver> StoreHandles<D> {
    pub fn connection(&self) -> &D::Connection {
        &self.connection
    }

    pub fn database(&self) -> &D::Database {
        &self.database
    }

    /// Cloned handles, for callers that need owned values (e.g. to move into a task).
    pub fn to_pair(&self) -> (D::Connection, D::Database) {
        (self.connection.clone(), self.database.clone())
    }
}

/// Single-shot memoizing accessor for the store connection.
pub struct ConnectionCache<D: StoreDriver, S: ConfigSource> {
    driver: D,
    config: S,
    slot: OnceCell<StoreHandles<D>>,
}

impl<D: StoreDriver, S: ConfigSource> ConnectionCache<D, S> {
    /// Creates an empty cache. Nothing is read or opened until the first `acquire`.
    pub fn new(driver: D, config: S) -> Self {
        Self {
            driver,
            config,
            slot: OnceCell::new(),
        }
    }

    /// Returns the cached pair, connecting first if the slot is empty.
    ///
    /// # Errors
    /// * [`StoreError::ConfigurationError`] if the address or database name is
    ///   missing. Raised before any network activity.
    /// * [`StoreError::ConnectionError`] if the driver fails to connect.
    ///
    /// Neither error is cached. A configuration error is only reported while
    /// the slot is still empty; if another caller populated it during the
    /// read, that pair is returned instead.
    pub async fn acquire(&self) -> Result<&StoreHandles<D>, StoreError> {
        if let Some(handles) = self.slot.get() {
            return Ok(handles);
        }

        let config = match self.config.load() {
            Ok(config) => config,
            Err(e) => return self.slot.get().ok_or(StoreError::from(e)),
        };
        self.slot.get_or_try_init(|| self.establish(config)).await
    }

    /// The cached pair, if any. Never performs I/O.
    pub fn get(&self) -> Option<&StoreHandles<D>> {
        self.slot.get()
    }

    pub fn is_connected(&self) -> bool {
        self.slot.initialized()
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn config(&self) -> &S {
        &self.config
    }

    async fn establish(&self, config: StoreConfig) -> Result<StoreHandles<D>, StoreError> {
        let address = redact_address(&config.address);
        debug!(%address, database = %config.database, "opening store connection");

        let connection = match self.driver.connect(&config.address).await {
            Ok(connection) => connection,
            Err(e) => {
                warn!(%address, error = %e, "store connection failed");
                return Err(e);
            }
        };
        let database = self.driver.database(&connection, &config.database);

        info!(%address, database = %config.database, "store connection established");
        Ok(StoreHandles {
            connection,
            database,
        })
    }
}
