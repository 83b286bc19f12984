//! Configuration management for the Todo API.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unparseable numeric values fall back to their defaults.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use todo_api_dynamodb::DynamoDbConfig;
use todo_api_web::ServiceInfo;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Storage backend configuration
    pub storage: StorageConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Deployment environment tag (`APP_ENV`)
    pub environment: String,
    /// Build/commit identifier (`GIT_SHA`)
    pub commit: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Storage backend configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Use the volatile in-memory store instead of DynamoDB
    pub use_memory_store: bool,
    /// DynamoDB table name
    pub table_name: String,
    /// AWS region
    pub region: String,
    /// DynamoDB endpoint override (e.g. DynamoDB Local)
    pub endpoint: Option<String>,
    /// Bounded wait per DynamoDB call, in milliseconds
    pub timeout_ms: Option<u64>,
}

impl StorageConfig {
    /// Settings for the durable store.
    #[must_use]
    pub fn dynamodb(&self) -> DynamoDbConfig {
        let mut config = DynamoDbConfig::new(&self.table_name).with_region(&self.region);
        if let Some(endpoint) = &self.endpoint {
            config = config.with_endpoint(endpoint);
        }
        if let Some(ms) = self.timeout_ms {
            config = config.with_request_timeout(Duration::from_millis(ms));
        }
        config
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    Pretty,
    /// JSON lines
    Json,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (trace, debug, info, warn, error); `RUST_LOG` wins
    pub level: String,
    /// Output format
    pub format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an explicit set of variables.
    #[must_use]
    pub fn from_vars(vars: &HashMap<String, String>) -> Self {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Build configuration from any variable source.
    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server: ServerConfig {
                host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: lookup("PORT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3000),
                shutdown_timeout: lookup("SHUTDOWN_TIMEOUT")
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            },
            storage: StorageConfig {
                use_memory_store: lookup("USE_MEMORY_STORE").is_some_and(|s| s == "true"),
                table_name: lookup("DYNAMODB_TABLE_NAME").unwrap_or_else(|| "todos".to_string()),
                region: lookup("AWS_REGION").unwrap_or_else(|| "us-east-1".to_string()),
                endpoint: lookup("DYNAMODB_ENDPOINT").filter(|s| !s.is_empty()),
                timeout_ms: lookup("DYNAMODB_TIMEOUT_MS").and_then(|s| s.parse().ok()),
            },
            logging: LoggingConfig {
                level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
                format: match lookup("LOG_FORMAT").as_deref() {
                    Some("json") => LogFormat::Json,
                    _ => LogFormat::Pretty,
                },
            },
            environment: lookup("APP_ENV").unwrap_or_else(|| "development".to_string()),
            commit: lookup("GIT_SHA").unwrap_or_else(|| "unknown".to_string()),
        }
    }

    /// Address to bind, as `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Drain period before shutdown is forced.
    #[must_use]
    pub const fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.server.shutdown_timeout)
    }

    /// Environment and commit for `/healthz`.
    #[must_use]
    pub fn service_info(&self) -> ServiceInfo {
        ServiceInfo::new(&self.environment, &self.commit)
    }
}
