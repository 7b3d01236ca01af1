use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Redis configuration
    #[serde(default)]
    pub redis: RedisConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file; a missing path yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) if path.exists() => {
                let display = path.display().to_string();
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: display.clone(),
                    source,
                })?;
                toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: display,
                    source,
                })?
            }
            _ => Self::default(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port must be > 0".into()));
        }
        if self.cache.published_ttl_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache.published_ttl_secs must be > 0".into(),
            ));
        }
        if self.cache.views_window_secs == 0 {
            return Err(ConfigError::Invalid(
                "cache.views_window_secs must be > 0".into(),
            ));
        }
        if self.redis.enabled && self.redis.url.is_empty() {
            return Err(ConfigError::Invalid(
                "redis.url must be set when redis is enabled".into(),
            ));
        }
        Ok(())
    }

    /// Socket address the server binds to.
    pub fn addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}
fn default_body_limit() -> usize {
    2 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Connection settings for the shared Redis cache tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Whether to use Redis at all; disabled means in-process cache only.
    #[serde(default = "default_redis_enabled")]
    pub enabled: bool,

    /// Redis connection URL (e.g., "redis://localhost:6379")
    #[serde(default = "default_redis_url")]
    pub url: String,

    /// Connection pool size
    #[serde(default = "default_redis_pool_size")]
    pub pool_size: usize,

    /// Connection timeout in milliseconds
    #[serde(default = "default_redis_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_redis_enabled() -> bool {
    false
}
fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}
fn default_redis_pool_size() -> usize {
    10
}
fn default_redis_timeout_ms() -> u64 {
    5000
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: default_redis_enabled(),
            url: default_redis_url(),
            pool_size: default_redis_pool_size(),
            timeout_ms: default_redis_timeout_ms(),
        }
    }
}

/// TTL and window settings for the cache tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Published-courses snapshot TTL in seconds
    #[serde(default = "default_published_ttl_secs")]
    pub published_ttl_secs: u64,

    /// View-counter rolling window in seconds
    #[serde(default = "default_views_window_secs")]
    pub views_window_secs: u64,
}

fn default_published_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_views_window_secs() -> u64 {
    86_400 // 24 hours
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            published_ttl_secs: default_published_ttl_secs(),
            views_window_secs: default_views_window_secs(),
        }
    }
}
