use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::codec::MessageFormat;
use crate::utils::RetryConfig;

// ============================================================================
// Application Configuration
// ============================================================================
//
// Load order (later sources override earlier ones):
//   1. built-in defaults
//   2. {config_dir}/default.toml (optional)
//   3. ORDER_EVENTS__* environment variables
//      e.g. ORDER_EVENTS__SERVER__PORT=9000 -> server.port
//
// ============================================================================

pub const ENV_PREFIX: &str = "ORDER_EVENTS";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 9090,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Number of concurrent publishers in the demo run
    pub publishers: usize,
    pub messages_per_publisher: usize,
    pub interval_ms: u64,
    pub retry_max_attempts: u32,
    pub retry_initial_delay_ms: u64,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            publishers: 2,
            messages_per_publisher: 3,
            interval_ms: 3000,
            retry_max_attempts: 3,
            retry_initial_delay_ms: 100,
        }
    }
}

impl PublisherConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig::new(
            self.retry_max_attempts,
            Duration::from_millis(self.retry_initial_delay_ms),
        )
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SubscriberConfig {
    pub subscribers: usize,
    pub max_delivery_attempts: u32,
    pub channel_capacity: usize,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            subscribers: 2,
            max_delivery_attempts: 5,
            channel_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub project_id: String,
    pub schema_name: String,
    pub topic: String,
    pub subscription: String,
    pub message_format: MessageFormat,
    pub server: ServerConfig,
    pub metrics: MetricsConfig,
    pub publisher: PublisherConfig,
    pub subscriber: SubscriberConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            project_id: "demo-project".to_string(),
            schema_name: "orders-schema".to_string(),
            topic: "orders-topic".to_string(),
            subscription: "orders-sub-avro".to_string(),
            message_format: MessageFormat::Avro,
            server: ServerConfig::default(),
            metrics: MetricsConfig::default(),
            publisher: PublisherConfig::default(),
            subscriber: SubscriberConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load from `config/` (or `ORDER_EVENTS_CONFIG_DIR`) and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let config_dir =
            std::env::var(format!("{ENV_PREFIX}_CONFIG_DIR")).unwrap_or_else(|_| "config".to_string());
        Self::load_from(Path::new(&config_dir))
    }

    pub fn load_from(config_dir: &Path) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}
