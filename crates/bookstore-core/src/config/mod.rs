//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod dev_proxy;
pub mod logging;
pub mod storage;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::dev_proxy::DevProxyConfig;
pub use self::logging::LoggingConfig;
pub use self::storage::{AvatarStorageConfig, StorageConfig};

use crate::error::AppError;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "BOOKSTORE";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// User record store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// File storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Development reverse proxy settings.
    #[serde(default)]
    pub dev_proxy: DevProxyConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which backend holds user records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseProvider {
    /// Process-local map; contents are lost on restart.
    Memory,
    /// PostgreSQL via sqlx.
    Postgres,
}

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Record store backend.
    #[serde(default = "default_provider")]
    pub provider: DatabaseProvider,
    /// PostgreSQL connection URL (ignored by the memory provider).
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    /// Run pending migrations at startup.
    #[serde(default = "default_true")]
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            auto_migrate: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `BOOKSTORE__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Load configuration from a single explicit file, still honoring
    /// environment variable overrides.
    pub fn load_from(path: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(true))
            .add_source(environment_source())
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to read '{path}': {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Parse configuration from an in-memory TOML string.
    pub fn from_toml(contents: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?;
        Ok(config.try_deserialize()?)
    }
}

impl AppConfig {
    /// Check cross-field constraints that serde defaults cannot express.
    ///
    /// Every problem found is reported in a single configuration error.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut problems = Vec::new();

        if self.database.provider == DatabaseProvider::Postgres && self.database.url.is_empty() {
            problems.push(
                "database.url is required when database.provider = \"postgres\"".to_string(),
            );
        }
        if self.auth.jwt_secret.is_empty() {
            problems.push("auth.jwt_secret must not be empty".to_string());
        }

        let avatars = &self.storage.avatars;
        if avatars.root_dir.trim().is_empty() {
            problems.push("storage.avatars.root_dir must not be empty".to_string());
        }
        if avatars.normalized_prefix() == "/" {
            problems.push("storage.avatars.public_prefix must not be the site root".to_string());
        }
        if avatars.write_timeout_seconds == 0 {
            problems.push("storage.avatars.write_timeout_seconds must be positive".to_string());
        }
        if avatars.max_bytes == Some(0) {
            problems.push("storage.avatars.max_bytes must be positive when set".to_string());
        }

        if !self.dev_proxy.target.starts_with("http://")
            && !self.dev_proxy.target.starts_with("https://")
        {
            problems.push(format!(
                "dev_proxy.target must be an http(s) origin, got '{}'",
                self.dev_proxy.target
            ));
        }
        for prefix in &self.dev_proxy.prefixes {
            if !prefix.starts_with('/') {
                problems.push(format!("dev_proxy prefix '{prefix}' must start with '/'"));
            }
        }

        if !matches!(self.logging.format.as_str(), "json" | "pretty") {
            problems.push(format!(
                "logging.format must be \"json\" or \"pretty\", got '{}'",
                self.logging.format
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::configuration(problems.join("; ")))
        }
    }
}

fn environment_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn default_provider() -> DatabaseProvider {
    DatabaseProvider::Memory
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}
