//! # Configuration Modules
//!
//! This module aggregates the configuration providers used to locate the
//! external data store.

/// Store address and logical database name, plus the sources they are read from.
pub mod config_store;
