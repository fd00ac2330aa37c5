//! Store driver trait.

use async_trait::async_trait;

use super::StoreError;

/// Connector for an external data store.
///
/// A driver opens a transport-level connection from an address and derives
/// logical database handles from it. Both handle types are cheap to clone and
/// every clone refers to the same underlying connection.
#[async_trait]
pub trait StoreDriver: Send + Sync + 'static {
    /// Handle to an open link to the store.
    type Connection: Clone + Send + Sync + 'static;

    /// Logical database scoped within a connection.
    type Database: Clone + Send + Sync + 'static;

    /// Open a new connection to `address`.
    async fn connect(&self, address: &str) -> Result<Self::Connection, StoreError>;

    /// Derive the database handle named `name` from an open connection.
    fn database(&self, connection: &Self::Connection, name: &str) -> Self::Database;
}

/// Liveness probe for a logical database handle.
#[async_trait]
pub trait DatabaseHealth: Send + Sync {
    /// The logical name the handle was derived with.
    fn database_name(&self) -> &str;

    /// Round-trips to the store. Fails with [`StoreError::QueryError`].
    async fn ping(&self) -> Result<(), StoreError>;
}
