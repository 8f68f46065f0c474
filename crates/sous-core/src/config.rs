//! SOUS Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for development.
//!
//! Author: sous maintainers

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Record store connection
    pub database: DatabaseConfig,

    /// NER model configuration
    pub model: ModelConfig,

    /// Labeling workflow configuration
    pub labeling: LabelingConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })
    }

    /// Load from `SOUS_CONFIG` if set, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        match std::env::var("SOUS_CONFIG") {
            Ok(path) => Self::from_file(path)?.with_env_override(),
            Err(_) => Self::from_env(),
        }
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        self.apply_env()?;
        Ok(self)
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            self.server.port = parse_var("API_PORT", port)?;
        }

        // Record store
        if let Ok(backend) = std::env::var("STORE_BACKEND") {
            self.database.backend = backend.parse()?;
        }
        if let Ok(url) = std::env::var("SURREALDB_URL") {
            self.database.surrealdb_url = url;
        }
        if let Ok(user) = std::env::var("SURREALDB_USER") {
            self.database.surrealdb_user = user;
        }
        if let Ok(pass) = std::env::var("SURREALDB_PASS") {
            self.database.surrealdb_pass = pass;
        }
        if let Ok(ns) = std::env::var("SURREALDB_NAMESPACE") {
            self.database.surrealdb_namespace = ns;
        }
        if let Ok(db) = std::env::var("SURREALDB_DATABASE") {
            self.database.surrealdb_database = db;
        }
        if let Ok(path) = std::env::var("SEED_PATH") {
            self.database.seed_path = Some(PathBuf::from(path));
        }

        // Model
        if let Ok(backend) = std::env::var("MODEL_BACKEND") {
            self.model.backend = backend.parse()?;
        }
        if let Ok(url) = std::env::var("MODEL_URL") {
            self.model.url = url;
        }
        if let Ok(secs) = std::env::var("MODEL_TIMEOUT_SECS") {
            self.model.timeout_secs = parse_var("MODEL_TIMEOUT_SECS", secs)?;
        }

        // Labeling
        if let Ok(size) = std::env::var("LABEL_BATCH_SIZE") {
            self.labeling.batch_size = parse_var("LABEL_BATCH_SIZE", size)?;
        }
        if let Ok(ordering) = std::env::var("LABEL_INDEX_ORDERING") {
            self.labeling.index_ordering = ordering.parse()?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            self.logging.json_format = parse_var("LOG_JSON", json)?;
        }

        Ok(())
    }

    /// Socket address string for the HTTP server
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_body_size: 64 * 1024,
        }
    }
}

/// Which record store implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    SurrealDb,
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "surrealdb" | "surreal" => Ok(Self::SurrealDb),
            "memory" => Ok(Self::Memory),
            _ => Err(ConfigError::InvalidValue {
                key: "STORE_BACKEND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Record store connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Store implementation
    pub backend: StoreBackend,

    /// SurrealDB WebSocket URL
    pub surrealdb_url: String,

    /// SurrealDB username
    pub surrealdb_user: String,

    /// SurrealDB password
    pub surrealdb_pass: String,

    /// SurrealDB namespace
    pub surrealdb_namespace: String,

    /// SurrealDB database name
    pub surrealdb_database: String,

    /// JSON file of records used to seed the in-memory store
    pub seed_path: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::SurrealDb,
            surrealdb_url: "ws://localhost:8000".to_string(),
            surrealdb_user: "root".to_string(),
            surrealdb_pass: "root".to_string(),
            surrealdb_namespace: "sous".to_string(),
            surrealdb_database: "ingredients".to_string(),
            seed_path: None,
        }
    }
}

/// Which predictor implementation to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelBackend {
    /// Remote model server
    Http,
    /// Built-in rule-based tagger
    Rules,
}

impl std::str::FromStr for ModelBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "rules" | "rule" => Ok(Self::Rules),
            _ => Err(ConfigError::InvalidValue {
                key: "MODEL_BACKEND".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// NER model configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Predictor implementation
    pub backend: ModelBackend,

    /// Base URL of the model server
    pub url: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: ModelBackend::Http,
            url: "http://localhost:8501".to_string(),
            timeout_secs: 30,
        }
    }
}

/// How `label_<N>` form fields are ordered before being matched to tokens.
///
/// `Lexicographic` compares the captured digits as text, so `label_10`
/// sorts between `label_1` and `label_2`. Records with ten or more tokens
/// get misaligned labels under this ordering; `Numeric` fixes that.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexOrdering {
    #[default]
    Lexicographic,
    Numeric,
}

impl std::str::FromStr for IndexOrdering {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lexicographic" | "lex" => Ok(Self::Lexicographic),
            "numeric" => Ok(Self::Numeric),
            _ => Err(ConfigError::InvalidValue {
                key: "LABEL_INDEX_ORDERING".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Labeling workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelingConfig {
    /// Records shown per page
    pub batch_size: usize,

    /// Ordering applied to submitted label fields
    pub index_ordering: IndexOrdering,
}

impl Default for LabelingConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            index_ordering: IndexOrdering::Lexicographic,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

impl From<ConfigError> for crate::SousError {
    fn from(err: ConfigError) -> Self {
        crate::SousError::ConfigError(err.to_string())
    }
}
