//! # In-Memory Store Driver
//!
//! A driver that "connects" without leaving the process. Useful for local
//! development and for exercising the connection cache: it counts connect
//! attempts, can treat chosen addresses as unreachable and can simulate a
//! slow handshake.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use super::driver::{DatabaseHealth, StoreDriver};
use super::StoreError;

/// Handle to an in-memory connection. Clones compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryConnection {
    id: u64,
    address: Arc<str>,
}

impl MemoryConnection {
    /// Unique per successful connect.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }
}

/// Logical database on an in-memory connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDatabase {
    connection_id: u64,
    name: Arc<str>,
}

impl MemoryDatabase {
    pub fn connection_id(&self) -> u64 {
        self.connection_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[async_trait]
impl DatabaseHealth for MemoryDatabase {
    fn database_name(&self) -> &str {
        &self.name
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryDriver {
    attempts: AtomicUsize,
    connects: AtomicUsize,
    next_id: AtomicU64,
    unreachable: Mutex<HashSet<String>>,
    latency: Duration,
}

impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every connect sleeps for `latency` before completing.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Connects to `address` fail until [`MemoryDriver::mark_reachable`] is called.
    pub fn mark_unreachable(&self, address: &str) {
        self.unreachable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.to_string());
    }

    pub fn mark_reachable(&self, address: &str) {
        self.unreachable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(address);
    }

    /// Number of times `connect` was entered, successful or not.
    pub fn connect_attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    /// Number of connections actually opened.
    pub fn connect_count(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    fn is_unreachable(&self, address: &str) -> bool {
        self.unreachable
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(address)
    }
}

#[async_trait]
impl StoreDriver for MemoryDriver {
    type Connection = MemoryConnection;
    type Database = MemoryDatabase;

    async fn connect(&self, address: &str) -> Result<MemoryConnection, StoreError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        // Reachability is decided when the attempt starts, not when it ends.
        let unreachable = self.is_unreachable(address);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        if unreachable {
            return Err(StoreError::ConnectionError(format!(
                "{} is unreachable",
                address
            )));
        }

        self.connects.fetch_add(1, Ordering::SeqCst);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(MemoryConnection {
            id,
            address: Arc::from(address),
        })
    }

    fn database(&self, connection: &MemoryConnection, name: &str) -> MemoryDatabase {
        MemoryDatabase {
            connection_id: connection.id,
            name: Arc::from(name),
        }
    }
}
