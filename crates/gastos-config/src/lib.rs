//! Configuration management for gastos
//!
//! This module handles loading, validation, and management of
//! gastos configuration from YAML files. Every field has a default,
//! so an empty file (or no file at all) yields a usable configuration.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::Path;

pub use error::{ConfigError, ConfigErrorSeverity, ConfigResult};

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// REST backend the front end talks to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Origin of the expense API, without trailing slash
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

/// Pagination settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Expenses per page on the main listing
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Upper bound accepted from the `size` query parameter
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u32,
    /// Results shown by the origem/pagador search pickers
    #[serde(default = "default_search_page_size")]
    pub search_page_size: u32,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            search_page_size: default_search_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    11
}

fn default_max_page_size() -> u32 {
    100
}

fn default_search_page_size() -> u32 {
    10
}

/// Query cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Seconds a fetched query stays fresh; 0 disables caching
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_ttl_secs(),
        }
    }
}

fn default_ttl_secs() -> u64 {
    30
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    #[serde(default = "default_symbol")]
    pub symbol: String,
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimal_separator: default_decimal_sep(),
            thousands_separator: default_thousands_sep(),
        }
    }
}

fn default_symbol() -> String {
    "R$".to_string()
}

fn default_decimal_sep() -> String {
    ",".to_string()
}

fn default_thousands_sep() -> String {
    ".".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub pagination: PaginationConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub currency: CurrencyConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// Values are not checked here; callers run `validate` once any
    /// command-line overrides are applied.
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        // An empty document deserializes to unit, not to a map
        let config: Config = if content.trim().is_empty() {
            Config::default()
        } else {
            serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
                message: e.to_string(),
            })?
        };

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(invalid("server.port", "Port must be greater than 0"));
        }

        let base_url = self.backend.base_url.trim();
        // The backend client speaks plain HTTP only
        if !base_url.starts_with("http://") {
            return Err(invalid("backend.base_url", "Backend URL must start with http://"));
        }

        if self.backend.timeout_secs == 0 {
            return Err(invalid("backend.timeout_secs", "Timeout must be at least 1 second"));
        }

        if self.pagination.page_size == 0 || self.pagination.search_page_size == 0 {
            return Err(invalid("pagination", "Page sizes must be at least 1"));
        }

        if self.pagination.page_size > self.pagination.max_page_size {
            return Err(invalid(
                "pagination.page_size",
                "page_size must not exceed max_page_size",
            ));
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Backend origin with any trailing slash removed
    pub fn backend_base_url(&self) -> &str {
        self.backend.base_url.trim().trim_end_matches('/')
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn invalid(field: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.backend.base_url, "http://localhost:8080");
        assert_eq!(config.pagination.page_size, 11);
        assert_eq!(config.pagination.search_page_size, 10);
        assert_eq!(config.currency.symbol, "R$");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_uses_defaults() {
        let config = Config::from_yaml("").unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.cache.ttl_secs, 30);
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let config = Config::from_yaml("backend:\n  base_url: http://api.local:9000/\n").unwrap();
        assert_eq!(config.backend_base_url(), "http://api.local:9000");
        assert_eq!(config.backend.timeout_secs, 10);
        assert_eq!(config.server.port, 8081);
    }

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.pagination.page_size, 11);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_rejects_non_http_backend() {
        let config = Config::from_yaml("backend:\n  base_url: localhost:8080\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "backend.base_url"));
    }

    #[test]
    fn test_rejects_page_size_above_max() {
        let config = Config::from_yaml("pagination:\n  page_size: 500\n").unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_parsing_leaves_validation_to_caller() {
        let mut config = Config::from_yaml("server:\n  port: 0\n").unwrap();
        assert!(config.validate().is_err());

        config.server.port = 9000;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unclosed").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load("/nonexistent/gastos.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
