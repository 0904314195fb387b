//! # configs
//!
//! Layered settings for the forum server. Sources, lowest precedence first:
//! struct defaults, `config/default.toml`, `config/{APP_ENV}.toml`, then
//! `FORUMS__SECTION__KEY` environment variables.

use std::time::Duration;

use domains::CourseSummary;
use secrecy::SecretString;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const ENV_PREFIX: &str = "FORUMS";
pub const DEFAULT_APP_ENV: &str = "development";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub log: LogSettings,
    /// Course list served by the in-memory course catalog.
    pub courses: Vec<CourseEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_allow_any_origin: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_allow_any_origin: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub backend: StorageBackend,
    #[serde(deserialize_with = "deserialize_secret")]
    pub url: Option<SecretString>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            url: None,
            max_connections: 5,
            acquire_timeout_secs: 5,
        }
    }
}

impl DatabaseSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// `EnvFilter` directive string, e.g. `info,services=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "info,course_forums=debug".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Keys are lowercased by the `config` crate, so entries use snake_case
/// rather than the API's camelCase.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseEntry {
    pub id: String,
    pub name: String,
}

impl From<CourseEntry> for CourseSummary {
    fn from(entry: CourseEntry) -> Self {
        Self {
            course_id: entry.id,
            course_name: entry.name,
        }
    }
}

/// The active environment name from `APP_ENV`, selecting `config/{name}.toml`.
pub fn app_env() -> String {
    resolve_app_env(std::env::var("APP_ENV").ok())
}

fn resolve_app_env(raw: Option<String>) -> String {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_APP_ENV.to_string())
}

impl Settings {
    /// Loads `.env`, then the layered sources described in the module docs.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be parsed or the result is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let app_env = app_env();

        let raw = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{app_env}")).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::from_config(raw)
    }

    /// Parses settings from a TOML document; environment is not consulted.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed or the result is invalid.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let raw = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        Self::from_config(raw)
    }

    fn from_config(raw: config::Config) -> Result<Self, ConfigError> {
        let settings: Self = raw.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                name: "server.port".to_string(),
                message: "must be non-zero".to_string(),
            });
        }
        if self.database.backend == StorageBackend::Postgres && self.database.url.is_none() {
            return Err(ConfigError::InvalidValue {
                name: "database.url".to_string(),
                message: "required when database.backend = \"postgres\"".to_string(),
            });
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue {
                name: "database.max_connections".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn course_summaries(&self) -> Vec<CourseSummary> {
        self.courses.iter().cloned().map(CourseSummary::from).collect()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(SecretString::from))
}
