//! Configuration for the daemon.
//!
//! Settings come from built-in defaults, then an optional TOML file, then
//! command-line flags and environment variables, each layer overriding the
//! one before it.

use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use todo_grpc::ServerConfig;

/// Database setting that selects the in-process store
pub const MEMORY_DATABASE: &str = ":memory:";

/// Daemon configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Resolved daemon configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DaemonConfig {
    /// Listen host
    pub host: String,

    /// Listen port; 0 picks an ephemeral port
    pub port: u16,

    /// SQLite database path, or `:memory:` for the in-process store
    pub database: String,

    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Store ping deadline for the liveness probe
    pub probe_timeout_ms: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database: "todo.db".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            probe_timeout_ms: 1000,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Listener settings
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port)
    }

    /// Liveness probe deadline
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Whether the in-process store was requested
    pub fn uses_memory_store(&self) -> bool {
        self.database == MEMORY_DATABASE
    }
}

/// Todo gRPC daemon
#[derive(Debug, Default, Parser)]
#[command(name = "todod", version, about = "Todo gRPC daemon")]
pub struct DaemonArgs {
    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Listen host
    #[arg(long, env = "HOST")]
    pub host: Option<String>,

    /// Listen port (0 for an ephemeral port)
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// SQLite database path, or ":memory:"
    #[arg(long, env = "TODO_DATABASE")]
    pub database: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum)]
    pub log_format: Option<LogFormat>,

    /// Store ping deadline for the liveness probe, in milliseconds
    #[arg(long, env = "PROBE_TIMEOUT_MS")]
    pub probe_timeout_ms: Option<u64>,
}

impl DaemonArgs {
    /// Layer flags and environment over the file (or defaults)
    pub fn resolve(self) -> Result<DaemonConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => DaemonConfig::from_file(path)?,
            None => DaemonConfig::default(),
        };

        if let Some(host) = self.host {
            config.host = host;
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(database) = self.database {
            config.database = database;
        }
        if let Some(log_level) = self.log_level {
            config.log_level = log_level;
        }
        if let Some(log_format) = self.log_format {
            config.log_format = log_format;
        }
        if let Some(probe_timeout_ms) = self.probe_timeout_ms {
            config.probe_timeout_ms = probe_timeout_ms;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.server_config().full_address(), "0.0.0.0:8080");
        assert_eq!(config.database, "todo.db");
        assert_eq!(config.probe_timeout(), Duration::from_secs(1));
        assert!(!config.uses_memory_store());
    }

    #[test]
    fn test_parse_partial_toml() {
        let toml = r#"
            port = 9000
            database = ":memory:"
            log_format = "json"
        "#;

        let config: DaemonConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 9000);
        assert!(config.uses_memory_store());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "host = \"127.0.0.1\"\nport = 9000\nlog_level = \"debug\"").unwrap();

        let args = DaemonArgs {
            config: Some(file.path().to_path_buf()),
            port: Some(0),
            ..Default::default()
        };
        let config = args.resolve().unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 0);
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_missing_file_is_error() {
        let args = DaemonArgs {
            config: Some(PathBuf::from("/nonexistent/todod.toml")),
            ..Default::default()
        };
        assert!(matches!(args.resolve(), Err(ConfigError::FileRead(_))));
    }

    #[test]
    fn test_bad_toml_is_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number\"").unwrap();

        assert!(matches!(
            DaemonConfig::from_file(file.path()),
            Err(ConfigError::TomlParse(_))
        ));
    }

    #[test]
    fn test_parse_flags() {
        let args = DaemonArgs::try_parse_from([
            "todod",
            "--host",
            "127.0.0.1",
            "--port",
            "0",
            "--database",
            ":memory:",
            "--log-format",
            "json",
            "--probe-timeout-ms",
            "250",
        ])
        .unwrap();
        let config = args.resolve().unwrap();

        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 0);
        assert!(config.uses_memory_store());
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.probe_timeout(), Duration::from_millis(250));
    }
}
