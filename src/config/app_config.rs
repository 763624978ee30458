//! Application configuration
//!
//! Built once at startup from the process environment (optionally seeded by a
//! `.env` file) and passed down explicitly. Nothing below `main` reads
//! environment variables.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use config::{Config, Environment};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Configuration error type
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// HTTP method used for the enrichment call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExternalApiMethod {
    #[default]
    Get,
    Post,
    Patch,
}

impl ExternalApiMethod {
    /// Parse a method name, falling back to GET for anything unsupported
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        match raw.map(str::trim).filter(|m| !m.is_empty()) {
            None => Self::Get,
            Some(m) => m.parse().unwrap_or_else(|_| {
                warn!("Unsupported EXTERNAL_API_METHOD '{}', using GET", m);
                Self::Get
            }),
        }
    }

    pub fn as_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Patch => reqwest::Method::PATCH,
        }
    }
}

impl FromStr for ExternalApiMethod {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PATCH" => Ok(Self::Patch),
            other => Err(ConfigError::Invalid(format!(
                "unsupported HTTP method '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ExternalApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_reqwest().as_str())
    }
}

/// Postgres connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    pub max_connections: u32,
}

// keep the password out of logs
impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("name", &self.name)
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Enrichment service settings
#[derive(Debug, Clone)]
pub struct ExternalApiConfig {
    pub url: Url,
    pub method: ExternalApiMethod,
}

/// Validated application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub external_api: ExternalApiConfig,
    pub server_port: u16,
    /// Deadline for the work done on behalf of one request
    pub request_timeout: Duration,
}

/// Raw keys as they appear in the environment (lowercased by `config`)
#[derive(Debug, Deserialize)]
struct RawConfig {
    #[serde(default)]
    db_host: String,
    #[serde(default = "default_db_port")]
    db_port: u16,
    #[serde(default)]
    db_user: String,
    #[serde(default)]
    db_password: String,
    #[serde(default)]
    db_name: String,
    #[serde(default = "default_db_max_connections")]
    db_max_connections: u32,
    #[serde(default)]
    external_api_full_url: String,
    #[serde(default)]
    external_api_method: Option<String>,
    #[serde(default = "default_server_port")]
    server_port: u16,
    #[serde(default = "default_request_timeout_secs")]
    request_timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default())
    }

    /// Load configuration from an explicit key/value map (keys as in the environment)
    #[cfg(test)]
    pub fn from_source(vars: config::Map<String, String>) -> Result<Self, ConfigError> {
        Self::from_environment(Environment::default().source(Some(vars)))
    }

    fn from_environment(env: Environment) -> Result<Self, ConfigError> {
        let raw: RawConfig = Config::builder()
            .add_source(env)
            .build()?
            .try_deserialize()?;

        Self::validate(raw)
    }

    fn validate(raw: RawConfig) -> Result<Self, ConfigError> {
        let required = [
            ("DB_HOST", &raw.db_host),
            ("DB_USER", &raw.db_user),
            ("DB_NAME", &raw.db_name),
            ("EXTERNAL_API_FULL_URL", &raw.external_api_full_url),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must be set", key)));
            }
        }

        let url = Url::parse(raw.external_api_full_url.trim()).map_err(|e| {
            ConfigError::Invalid(format!(
                "EXTERNAL_API_FULL_URL '{}' is not a valid URL: {}",
                raw.external_api_full_url, e
            ))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid(format!(
                "EXTERNAL_API_FULL_URL must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if raw.db_max_connections == 0 {
            return Err(ConfigError::Invalid(
                "DB_MAX_CONNECTIONS must be at least 1".to_string(),
            ));
        }
        if raw.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "REQUEST_TIMEOUT_SECS must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            database: DatabaseConfig {
                host: raw.db_host,
                port: raw.db_port,
                user: raw.db_user,
                password: raw.db_password,
                name: raw.db_name,
                max_connections: raw.db_max_connections,
            },
            external_api: ExternalApiConfig {
                url,
                method: ExternalApiMethod::parse_or_default(raw.external_api_method.as_deref()),
            },
            server_port: raw.server_port,
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
        })
    }
}

// Default value functions for serde

fn default_db_port() -> u16 {
    5432
}

fn default_db_max_connections() -> u32 {
    5
}

fn default_server_port() -> u16 {
    8080
}

fn default_request_timeout_secs() -> u64 {
    10
}
