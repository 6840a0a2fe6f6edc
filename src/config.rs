use std::collections::HashMap;
use std::time::Duration;

use crate::domain::order::ORDER_CREATED_TOPIC;

// ============================================================================
// Configuration
// ============================================================================
//
// Built once at process start from environment variables and passed down
// explicitly. No other module reads the environment.
//
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{name} must be {expected}, got {value:?}")]
    Invalid {
        name: &'static str,
        expected: &'static str,
        value: String,
    },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Which binary is being configured; decides a few defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceKind {
    ApiGateway,
    OrderService,
}

impl ServiceKind {
    pub fn name(&self) -> &'static str {
        match self {
            ServiceKind::ApiGateway => "api-gateway",
            ServiceKind::OrderService => "order-service",
        }
    }

    fn default_port(&self) -> u16 {
        match self {
            ServiceKind::ApiGateway => 3000,
            ServiceKind::OrderService => 3002,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub service: ServiceKind,
    pub kafka: KafkaConfig,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub client_id: String,
    pub group_id: String,
    pub topic: String,
    pub message_timeout: Duration,
}

impl KafkaConfig {
    /// Broker list in the comma-separated form librdkafka expects.
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub use_in_memory: bool,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend<'a> {
    InMemory,
    Postgres(&'a str),
}

impl DatabaseConfig {
    /// In-memory when forced or when no connection string is configured.
    pub fn backend(&self) -> StorageBackend<'_> {
        match self.url.as_deref() {
            Some(url) if !self.use_in_memory => StorageBackend::Postgres(url),
            _ => StorageBackend::InMemory,
        }
    }
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env(service: ServiceKind) -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env file");
        }
        Self::from_lookup(service, |name| std::env::var(name).ok())
    }

    pub fn from_map(service: ServiceKind, vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(service, |name| vars.get(name).cloned())
    }

    fn from_lookup<F>(service: ServiceKind, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let brokers: Vec<String> = var("KAFKA_BROKERS")
            .or_else(|| var("KAFKA_BROKER"))
            .unwrap_or_else(|| "localhost:9092".to_string())
            .split(',')
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .collect();
        if brokers.is_empty() {
            return Err(ConfigError::Empty("KAFKA_BROKERS"));
        }

        let message_timeout_ms: u64 = parse(var("KAFKA_MESSAGE_TIMEOUT_MS"), "KAFKA_MESSAGE_TIMEOUT_MS", "a number of milliseconds")?
            .unwrap_or(5000);

        let kafka = KafkaConfig {
            brokers,
            client_id: var("KAFKA_CLIENT_ID").unwrap_or_else(|| service.name().to_string()),
            group_id: var("KAFKA_GROUP_ID").unwrap_or_else(|| "order-service-group".to_string()),
            topic: var("KAFKA_TOPIC_ORDER_CREATED").unwrap_or_else(|| ORDER_CREATED_TOPIC.to_string()),
            message_timeout: Duration::from_millis(message_timeout_ms),
        };

        let server = ServerConfig {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse(var("PORT"), "PORT", "a TCP port")?.unwrap_or(service.default_port()),
        };

        let use_in_memory = match var("USE_IN_MEMORY_DB").as_deref() {
            None => false,
            Some("true") | Some("1") => true,
            Some("false") | Some("0") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    name: "USE_IN_MEMORY_DB",
                    expected: "true or false",
                    value: other.to_string(),
                })
            }
        };

        let database = DatabaseConfig {
            url: var("DATABASE_URL"),
            use_in_memory,
            max_connections: parse(var("DATABASE_MAX_CONNECTIONS"), "DATABASE_MAX_CONNECTIONS", "a positive integer")?
                .unwrap_or(5),
        };

        if database.url.is_none() && !database.use_in_memory && service == ServiceKind::OrderService {
            tracing::warn!("DATABASE_URL not set, falling back to in-memory repository");
        }

        Ok(Self {
            service,
            kafka,
            server,
            database,
        })
    }
}

fn parse<T: std::str::FromStr>(
    value: Option<String>,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|v| {
            v.parse::<T>().map_err(|_| ConfigError::Invalid {
                name,
                expected,
                value: v.clone(),
            })
        })
        .transpose()
}
