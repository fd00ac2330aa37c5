use clap::Parser;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_CONFIG_FILE: &str = "server_budget.conf";
const DEFAULT_PORT: u16 = 3000;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_LOG_JSON: bool = false;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;

#[derive(Parser, Deserialize, Serialize, Debug, Clone, Default)]
#[clap(about = "Budget backend store status server", version)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    #[clap(long, env = "BUDGET_PORT", help = "HTTP server port.")]
    pub port: Option<u16>,

    #[clap(long, env = "BUDGET_CONFIG_PATH", help = "Path to the JSON configuration file.")]
    pub config_path: Option<PathBuf>,

    #[clap(long, env = "BUDGET_LOG_LEVEL", help = "Default tracing filter when RUST_LOG is unset (trace, debug, info, warn, error).")]
    pub log_level: Option<String>,

    #[clap(long, env = "BUDGET_LOG_JSON", help = "Emit logs as JSON lines (true/false).")]
    pub log_json: Option<bool>,

    #[clap(long, env = "BUDGET_MAX_CONNECTIONS", help = "Maximum connections in the store pool.")]
    pub max_connections: Option<u32>,

    #[clap(long, env = "BUDGET_ACQUIRE_TIMEOUT_SECS", help = "Seconds to wait for a pooled store connection.")]
    pub acquire_timeout_secs: Option<u64>,
}

/// Fully resolved settings, every field filled in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl ServerConfig {
    // Merge two ServerConfig structs, where 'other' overrides 'self' for Some values
    fn merge(self, other: ServerConfig) -> ServerConfig {
        ServerConfig {
            port: other.port.or(self.port),
            config_path: other.config_path.or(self.config_path),
            log_level: other.log_level.or(self.log_level),
            log_json: other.log_json.or(self.log_json),
            max_connections: other.max_connections.or(self.max_connections),
            acquire_timeout_secs: other.acquire_timeout_secs.or(self.acquire_timeout_secs),
        }
    }

    fn defaults() -> ServerConfig {
        ServerConfig {
            port: Some(DEFAULT_PORT),
            log_level: Some(DEFAULT_LOG_LEVEL.to_string()),
            log_json: Some(DEFAULT_LOG_JSON),
            max_connections: Some(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout_secs: Some(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            ..Default::default()
        }
    }

    fn into_settings(self) -> ServerSettings {
        ServerSettings {
            port: self.port.unwrap_or(DEFAULT_PORT),
            log_level: self
                .log_level
                .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            log_json: self.log_json.unwrap_or(DEFAULT_LOG_JSON),
            max_connections: self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS),
            acquire_timeout: Duration::from_secs(
                self.acquire_timeout_secs
                    .unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            ),
        }
    }
}

/// Parses the command line (and environment), then resolves the layers.
pub fn load_config() -> ServerSettings {
    resolve(ServerConfig::parse())
}

/// Defaults, then the JSON config file, then CLI/env values.
///
/// A config file that is missing or unreadable is skipped.
pub fn resolve(cli_args: ServerConfig) -> ServerSettings {
    let config_file_path = cli_args
        .config_path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    let mut current_config = ServerConfig::defaults();

    if config_file_path.exists() {
        match fs::read_to_string(&config_file_path) {
            Ok(config_str) => match serde_json::from_str::<ServerConfig>(&config_str) {
                Ok(file_config) => current_config = current_config.merge(file_config),
                Err(e) => tracing::warn!(
                    "Failed to parse config file {}: {}. Falling back to other sources.",
                    config_file_path.display(),
                    e
                ),
            },
            Err(e) => tracing::warn!(
                "Failed to read config file {}: {}. Falling back to other sources.",
                config_file_path.display(),
                e
            ),
        }
    }

    current_config.merge(cli_args).into_settings()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn no_file() -> ServerConfig {
        ServerConfig {
            config_path: Some(PathBuf::from("/nonexistent/server_budget.conf")),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let settings = resolve(no_file());
        assert_eq!(settings.port, 3000);
        assert_eq!(settings.log_level, "info");
        assert!(!settings.log_json);
        assert_eq!(settings.max_connections, 5);
        assert_eq!(settings.acquire_timeout, Duration::from_secs(3));
    }

    #[test]
    fn unset_fields_resolve_to_the_same_defaults() {
        assert_eq!(
            ServerConfig::default().into_settings(),
            ServerConfig::defaults().into_settings()
        );
    }

    #[test]
    fn file_overrides_defaults_and_cli_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 8080, "maxConnections": 12, "logJson": true}}"#).unwrap();

        let cli = ServerConfig {
            config_path: Some(file.path().to_path_buf()),
            port: Some(9090),
            ..Default::default()
        };
        let settings = resolve(cli);
        assert_eq!(settings.port, 9090);
        assert_eq!(settings.max_connections, 12);
        assert!(settings.log_json);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn malformed_file_is_ignored() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        let cli = ServerConfig {
            config_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(resolve(cli), resolve(no_file()));
    }
}
