//! Configuration management for the MCP server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default RapidAPI endpoint for stock modules.
pub const DEFAULT_STOCK_API_URL: &str =
    "https://yahoo-finance15.p.rapidapi.com/api/v1/markets/stock/modules";

/// Default value of the `X-RapidAPI-Host` header.
pub const DEFAULT_STOCK_API_HOST: &str = "yahoo-finance15.p.rapidapi.com";

/// Default module selector sent with every stock request.
pub const DEFAULT_STOCK_MODULE: &str = "statistics";

/// Main configuration structure for the MCP server.
///
/// This struct contains all configurable aspects of the server, organized
/// by concern for clarity and maintainability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Upstream stock API endpoint configuration.
    pub upstream: UpstreamConfig,

    /// External API credentials configuration.
    pub credentials: CredentialsConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,

    /// Whether to include timestamps in log output.
    pub with_timestamps: bool,
}

/// Where and how the stock tool reaches the third-party API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Fully-qualified endpoint; query parameters are appended per call.
    pub base_url: String,

    /// Value sent in the `X-RapidAPI-Host` header.
    pub host: String,

    /// Value of the `module` query parameter.
    pub module: String,
}

/// Configuration for external API credentials.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct CredentialsConfig {
    /// RapidAPI key sent as `X-RapidAPI-Key`.
    /// An absent key is sent as an empty string. Never serialized.
    #[serde(skip_serializing)]
    pub rapidapi_key: Option<String>,
}

/// Custom Debug implementation to redact secrets from logs.
impl std::fmt::Debug for CredentialsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsConfig")
            .field(
                "rapidapi_key",
                &self.rapidapi_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            with_timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Read `MCP_LOG_LEVEL` and `MCP_LOG_TIMESTAMPS`.
    ///
    /// Kept separate from [`Config::from_env`] so logging can be initialized
    /// before the rest of the configuration is loaded (and logged).
    pub fn from_env() -> Self {
        let mut logging = Self::default();

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            logging.level = level;
        }

        if let Ok(timestamps) = std::env::var("MCP_LOG_TIMESTAMPS") {
            logging.with_timestamps = timestamps.parse().unwrap_or(true);
        }

        logging
    }
}

impl CredentialsConfig {
    /// The key to put on the wire: the configured one, or `""`.
    pub fn rapidapi_key_or_empty(&self) -> &str {
        self.rapidapi_key.as_deref().unwrap_or_default()
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_STOCK_API_URL.to_string(),
            host: DEFAULT_STOCK_API_HOST.to_string(),
            module: DEFAULT_STOCK_MODULE.to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "stock-mcp-server".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig::default(),
            transport: TransportConfig::default(),
            upstream: UpstreamConfig::default(),
            credentials: CredentialsConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Server settings use the `MCP_` prefix (`MCP_SERVER_NAME`, `MCP_LOG_LEVEL`,
    /// `MCP_STOCK_API_URL`, ...). The API key is read from `RAPIDAPI_KEY`, the
    /// name MCP client configurations already pass through.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        config.logging = LoggingConfig::from_env();

        // Load transport configuration from environment
        config.transport = TransportConfig::from_env();

        if let Ok(url) = std::env::var("MCP_STOCK_API_URL") {
            config.upstream.base_url = url;
        }

        if let Ok(host) = std::env::var("MCP_STOCK_API_HOST") {
            config.upstream.host = host;
        }

        if let Ok(module) = std::env::var("MCP_STOCK_MODULE") {
            config.upstream.module = module;
        }

        // Load RapidAPI key
        match std::env::var("RAPIDAPI_KEY") {
            Ok(api_key) if !api_key.is_empty() => {
                config.credentials.rapidapi_key = Some(api_key);
                info!("RapidAPI key loaded from environment");
            }
            _ => {
                warn!(
                    "RAPIDAPI_KEY not set - requests will be sent with an empty key \
                     and the upstream API will likely reject them"
                );
            }
        }

        config
    }
}
