//! # Store Configuration
//!
//! Locates the external data store: a connection address and a logical
//! database name. Values are produced by a [`ConfigSource`] each time they are
//! asked for, so a source backed by the environment always reflects the
//! current process state.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;
use url::Url;

/// Default environment variable holding the store address.
pub const DEFAULT_ADDRESS_VAR: &str = "DATABASE_URL";
/// Default environment variable holding the logical database name.
pub const DEFAULT_DATABASE_VAR: &str = "DATABASE_NAME";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Store address is not configured")]
    MissingAddress,

    #[error("Logical database name is not configured")]
    MissingDatabase,

    #[error("Environment variable {var} could not be read: {source}")]
    VarError {
        var: String,
        #[source]
        source: env::VarError,
    },

    #[error("Failed to load .env file: {0}")]
    DotenvError(#[from] dotenvy::Error),
}

/// Address and logical database name of the external store.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub address: String,
    pub database: String,
}

impl StoreConfig {
    pub fn new(address: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            database: database.into(),
        }
    }

    /// Rejects blank values. Whitespace-only counts as blank.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.address.trim().is_empty() {
            return Err(ConfigError::MissingAddress);
        }
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingDatabase);
        }
        Ok(self)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("address", &redact_address(&self.address))
            .field("database", &self.database)
            .finish()
    }
}

/// Something that can produce a validated [`StoreConfig`] on demand.
pub trait ConfigSource: Send + Sync + 'static {
    fn load(&self) -> Result<StoreConfig, ConfigError>;
}

impl ConfigSource for StoreConfig {
    fn load(&self) -> Result<StoreConfig, ConfigError> {
        self.clone().validate()
    }
}

/// Reads the store configuration from process environment variables.
///
/// Unset variables read as empty and are reported by validation, so a missing
/// `DATABASE_URL` surfaces as [`ConfigError::MissingAddress`].
#[derive(Debug, Clone)]
pub struct EnvConfigSource {
    address_var: String,
    database_var: String,
}

impl Default for EnvConfigSource {
    fn default() -> Self {
        Self::with_vars(DEFAULT_ADDRESS_VAR, DEFAULT_DATABASE_VAR)
    }
}

impl EnvConfigSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses custom variable names instead of `DATABASE_URL` / `DATABASE_NAME`.
    pub fn with_vars(address_var: impl Into<String>, database_var: impl Into<String>) -> Self {
        Self {
            address_var: address_var.into(),
            database_var: database_var.into(),
        }
    }

    pub fn address_var(&self) -> &str {
        &self.address_var
    }

    pub fn database_var(&self) -> &str {
        &self.database_var
    }

    fn read_var(name: &str) -> Result<String, ConfigError> {
        match env::var(name) {
            Ok(value) => Ok(value),
            Err(env::VarError::NotPresent) => Ok(String::new()),
            Err(e) => Err(ConfigError::VarError {
                var: name.to_string(),
                source: e,
            }),
        }
    }
}

impl ConfigSource for EnvConfigSource {
    fn load(&self) -> Result<StoreConfig, ConfigError> {
        let address = Self::read_var(&self.address_var)?;
        let database = Self::read_var(&self.database_var)?;
        StoreConfig::new(address, database).validate()
    }
}

/// Loads `.env` from the current directory or its parents.
///
/// A missing file is not an error; `Ok(None)` is returned instead.
pub fn load_dotenv() -> Result<Option<PathBuf>, ConfigError> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(ConfigError::DotenvError(e)),
    }
}

/// Loads a specific env file. Variables already set in the process win.
pub fn load_dotenv_from(path: &Path) -> Result<(), ConfigError> {
    dotenvy::from_path(path)?;
    Ok(())
}

/// Query parameters that carry credentials in connection strings.
const SECRET_QUERY_KEYS: &[&str] = &["password", "sslpassword"];

const OPAQUE_ADDRESS: &str = "<opaque address>";

/// Masks the password of a URL-shaped address so it can be logged.
///
/// Covers both the userinfo password and `password` / `sslpassword` query
/// parameters.
pub fn redact_address(address: &str) -> String {
    let Ok(mut url) = Url::parse(address) else {
        return OPAQUE_ADDRESS.to_string();
    };

    if url.password().is_some() && url.set_password(Some("***")).is_err() {
        return OPAQUE_ADDRESS.to_string();
    }

    let has_secret = url.query_pairs().any(|(key, _)| is_secret_key(&key));
    if has_secret {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(key, value)| {
                let value = if is_secret_key(&key) {
                    "***".to_string()
                } else {
                    value.into_owned()
                };
                (key.into_owned(), value)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    url.to_string()
}

fn is_secret_key(key: &str) -> bool {
    SECRET_QUERY_KEYS
        .iter()
        .any(|secret| key.eq_ignore_ascii_case(secret))
}
