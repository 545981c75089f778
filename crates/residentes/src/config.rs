//! Configuration management for residentes.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use axum::http::HeaderValue;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "residentes";

/// Extension appended to the database name to form the file name.
const DATABASE_FILE_EXTENSION: &str = "sqlite";

/// Prefix for environment variable overrides.
const ENV_PREFIX: &str = "RESIDENTES_";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `RESIDENTES_`, e.g.
///    `RESIDENTES_SERVER_PORT=9000`)
/// 2. TOML config file at `~/.config/residentes/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Cross-origin access for browser frontends.
    pub cors: CorsConfig,
}

/// Cross-origin resource sharing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Origins allowed to call the API with credentials, e.g.
    /// `http://localhost:5173`. Empty disables cross-origin access.
    pub origins: Vec<String>,
}

/// Database configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Logical database name; also the file stem of the default path.
    pub name: String,
    /// Explicit path to the database file.
    /// Defaults to `~/.local/share/residentes/<name>.sqlite`
    pub path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors: CorsConfig::default(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:5173".to_string(),
            ],
        }
    }
}

impl CorsConfig {
    /// The origins as header values.
    ///
    /// # Errors
    ///
    /// Returns an error for a wildcard or an origin that is not a valid
    /// header value.
    pub fn header_values(&self) -> Result<Vec<HeaderValue>> {
        self.origins
            .iter()
            .map(|origin| {
                let origin = origin.trim();
                if origin.is_empty() || origin == "*" {
                    return Err(Error::ConfigValidation {
                        message: format!(
                            "server.cors.origins entries must be explicit origins, got {origin:?}"
                        ),
                    });
                }
                HeaderValue::from_str(origin).map_err(|_| Error::ConfigValidation {
                    message: format!("server.cors.origins contains an invalid origin: {origin}"),
                })
            })
            .collect()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: "residentes_db".to_string(),
            path: None, // Will be resolved to default at runtime
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);
        Self::from_figment(Self::figment(&config_file))
    }

    /// The provider chain, without extracting.
    fn figment(config_file: &std::path::Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("_"))
    }

    fn from_figment(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::ConfigValidation {
                message: "server.port must be greater than 0".to_string(),
            });
        }

        if self.server.host.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "server.host cannot be empty".to_string(),
            });
        }

        self.server.cors.header_values()?;

        let name = self.database.name.trim();
        if name.is_empty() {
            return Err(Error::ConfigValidation {
                message: "database.name cannot be empty".to_string(),
            });
        }
        if name.contains(['/', '\\']) {
            return Err(Error::ConfigValidation {
                message: format!("database.name must not contain path separators: {name}"),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.database.path.clone().unwrap_or_else(|| {
            Self::default_data_dir()
                .join(format!("{}.{DATABASE_FILE_EXTENSION}", self.database.name))
        })
    }

    /// The socket address the server binds, as `host:port`.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
