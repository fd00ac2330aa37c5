//! # Loggers
//!
//! Installs the global `tracing` subscriber used by the binaries.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("Failed to install tracing subscriber: {0}")]
    Init(String),
}

/// Builds the filter: `RUST_LOG` when set and valid, `default_level` otherwise.
pub fn build_filter(default_level: &str) -> EnvFilter {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    filter_from(directives.as_deref(), default_level)
}

/// Uses `directives` if present and parseable, `default_level` otherwise.
pub fn filter_from(directives: Option<&str>, default_level: &str) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(default_level))
}

/// Installs a formatted (or JSON) subscriber as the global default.
///
/// # Arguments
/// * `default_level` - Filter directive used when `RUST_LOG` is absent (e.g. "info").
/// * `json` - Emit one JSON object per event instead of human-readable lines.
pub fn init_tracing(default_level: &str, json: bool) -> Result<(), LoggerError> {
    let builder = tracing_subscriber::fmt().with_env_filter(build_filter(default_level));

    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| LoggerError::Init(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_install_is_rejected() {
        let _ = init_tracing("debug", false);
        let second = init_tracing("info", true);
        assert!(matches!(second, Err(LoggerError::Init(_))));
    }

    #[test]
    fn filter_falls_back_to_default_level() {
        assert_eq!(filter_from(None, "warn").to_string(), "warn");
    }

    #[test]
    fn filter_prefers_explicit_directives() {
        assert_eq!(filter_from(Some("debug"), "warn").to_string(), "debug");
    }

    #[test]
    fn invalid_directives_fall_back_to_default_level() {
        assert_eq!(
            filter_from(Some("lib_store=notalevel"), "warn").to_string(),
            "warn"
        );
    }
}
