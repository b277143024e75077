use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

pub mod defaults;

use defaults::*;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Upper bound for fetching a remote playlist, e.g. "30s" or "2m"
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout: String,
    /// Category assigned when the mapping has no entry for a source category
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_database_url() -> String {
    DEFAULT_DATABASE_URL.to_string()
}

fn default_fetch_timeout() -> String {
    DEFAULT_FETCH_TIMEOUT.to_string()
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            fetch_timeout: default_fetch_timeout(),
            default_category: default_category(),
            user_agent: default_user_agent(),
        }
    }
}

impl ImportConfig {
    /// Parse `fetch_timeout` into a [`Duration`]
    pub fn fetch_timeout_duration(&self) -> AppResult<Duration> {
        humantime::parse_duration(&self.fetch_timeout).map_err(|e| {
            AppError::configuration(format!(
                "invalid import.fetch_timeout '{}': {e}",
                self.fetch_timeout
            ))
        })
    }
}

impl DatabaseConfig {
    /// SQLite in-memory databases are private to a connection, so they only
    /// ever get one.
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }

    pub fn effective_max_connections(&self) -> u32 {
        if self.is_in_memory() {
            1
        } else {
            self.max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS)
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: default_database_url(),
                max_connections: Some(DEFAULT_MAX_CONNECTIONS),
            },
            import: ImportConfig::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            Ok(toml::from_str(&contents)?)
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            Ok(default_config)
        }
    }
}
