//! # lib_store
//!
//! Shared backend plumbing for the budget service: store configuration,
//! the cached store connection and tracing setup. Each folder is gated
//! behind a cargo feature of the same name.

#[cfg(feature = "configs")]
pub mod configs;

#[cfg(feature = "connections")]
pub mod connections;

#[cfg(feature = "loggers")]
pub mod loggers;

// Re-export the types most callers need.
#[cfg(feature = "configs")]
pub use configs::config_store::{ConfigError, ConfigSource, EnvConfigSource, StoreConfig};

#[cfg(feature = "connections")]
pub use connections::{ConnectionCache, StoreDriver, StoreError, StoreHandles};
