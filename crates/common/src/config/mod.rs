//! Configuration management for TextSum services
//!
//! Supports loading configuration from:
//! - Environment variables (prefixed with APP__)
//! - Configuration files (config/default.toml, config/{APP_ENV}.toml, config/local.toml)
//! - Default values
//!
//! The loaded [`AppConfig`] is built once in `main` and handed to components
//! explicitly; nothing reads it from a global.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Deployment environment, reported by `/ping`
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Record store configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Article summarizer configuration
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnvironmentConfig {
    /// Environment name (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub name: String,

    /// Running under the test harness
    #[serde(default)]
    pub testing: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Grace period for draining background enrichment on shutdown
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,

    /// Maximum concurrent requests
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_requests: usize,
}

/// Which [`SummaryStore`](crate::db::SummaryStore) implementation backs the service
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// SQL database through SeaORM (Postgres or SQLite, chosen by URL)
    #[default]
    Sql,
    /// Process-local map; contents are lost on restart
    Memory,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Store implementation
    #[serde(default)]
    pub backend: StoreBackend,

    /// Database URL (ignored by the memory backend)
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Idle timeout in seconds
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// Create the summaries table on startup if it does not exist
    #[serde(default = "default_auto_migrate")]
    pub auto_migrate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SummarizerConfig {
    /// Summarizer provider: extractive, mock
    #[serde(default = "default_summarizer_provider")]
    pub provider: String,

    /// Upper bound on one summarization (fetch + summarize) in seconds
    #[serde(default = "default_summarizer_timeout")]
    pub timeout_secs: u64,

    /// Number of sentences kept in a summary
    #[serde(default = "default_max_sentences")]
    pub max_sentences: usize,

    /// Pages larger than this are not summarized
    #[serde(default = "default_max_content_bytes")]
    pub max_content_bytes: usize,

    /// User-Agent sent when fetching articles
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level (debug, info, warn, error); RUST_LOG takes precedence
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default = "default_json_logging")]
    pub json_logging: bool,

    /// Metrics port (0 to disable)
    #[serde(default = "default_metrics_port")]
    pub metrics_port: u16,

    /// Service name for logs
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

// Default value functions
fn default_environment() -> String { "dev".to_string() }
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_request_timeout() -> u64 { 30 }
fn default_shutdown_timeout() -> u64 { 30 }
fn default_max_concurrent() -> usize { 100 }
fn default_database_url() -> String { "postgres://localhost/textsum".to_string() }
fn default_max_connections() -> u32 { 20 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 10 }
fn default_idle_timeout() -> u64 { 300 }
fn default_auto_migrate() -> bool { true }
fn default_summarizer_provider() -> String { "extractive".to_string() }
fn default_summarizer_timeout() -> u64 { 30 }
fn default_max_sentences() -> usize { 5 }
fn default_max_content_bytes() -> usize { 2 * 1024 * 1024 }
fn default_user_agent() -> String { format!("textsum/{}", env!("CARGO_PKG_VERSION")) }
fn default_log_level() -> String { "info".to_string() }
fn default_json_logging() -> bool { true }
fn default_metrics_port() -> u16 { 9090 }
fn default_service_name() -> String { "textsum".to_string() }

impl AppConfig {
    /// Load configuration from environment and files
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Load base config file
            .add_source(File::with_name("config/default").required(false))

            // Load environment-specific config
            .add_source(File::with_name(&format!("config/{}", env)).required(false))

            // Load local overrides
            .add_source(File::with_name("config/local").required(false))

            // Load from environment variables with APP__ prefix
            // e.g., APP__SERVER__PORT=8081
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )

            .build()?;

        config.try_deserialize()
    }

    /// Load from a specific TOML file
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
            )
            .build()?;

        config.try_deserialize()
    }

    /// Configuration for tests: in-memory store, mock summarizer, no exporter
    pub fn for_testing() -> Self {
        let mut config = Self::default();
        config.environment.name = "test".to_string();
        config.environment.testing = true;
        config.database.backend = StoreBackend::Memory;
        config.summarizer.provider = "mock".to_string();
        config.summarizer.timeout_secs = 5;
        config.observability.metrics_port = 0;
        config.observability.json_logging = false;
        config
    }

    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Get shutdown timeout as Duration
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout_secs)
    }

    /// Get summarizer timeout as Duration
    pub fn summarizer_timeout(&self) -> Duration {
        Duration::from_secs(self.summarizer.timeout_secs)
    }
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            name: default_environment(),
            testing: false,
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_secs: default_request_timeout(),
            shutdown_timeout_secs: default_shutdown_timeout(),
            max_concurrent_requests: default_max_concurrent(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            url: default_database_url(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            auto_migrate: default_auto_migrate(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            provider: default_summarizer_provider(),
            timeout_secs: default_summarizer_timeout(),
            max_sentences: default_max_sentences(),
            max_content_bytes: default_max_content_bytes(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            json_logging: default_json_logging(),
            metrics_port: default_metrics_port(),
            service_name: default_service_name(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: EnvironmentConfig::default(),
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            summarizer: SummarizerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.backend, StoreBackend::Sql);
        assert_eq!(config.summarizer.provider, "extractive");
        assert_eq!(config.environment.name, "dev");
        assert!(!config.environment.testing);
    }

    #[test]
    fn test_testing_config() {
        let config = AppConfig::for_testing();
        assert!(config.environment.testing);
        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.observability.metrics_port, 0);
        assert_eq!(config.summarizer_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_partial_source_fills_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(
                r#"
                [database]
                backend = "memory"

                [summarizer]
                max_sentences = 3
                "#,
                config::FileFormat::Toml,
            ))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.database.backend, StoreBackend::Memory);
        assert_eq!(config.database.url, "postgres://localhost/textsum");
        assert_eq!(config.summarizer.max_sentences, 3);
        assert_eq!(config.summarizer.timeout_secs, 30);
        assert_eq!(config.server.port, 8000);
    }
}
