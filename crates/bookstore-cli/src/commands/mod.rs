//! CLI command definitions and dispatch.

pub mod config;
pub mod dev_proxy;
pub mod serve;
pub mod token;
pub mod user;

use clap::{Parser, Subcommand};

use bookstore_core::config::AppConfig;
use bookstore_core::error::AppError;

use crate::output::OutputFormat;

/// Environment variable selecting the configuration overlay.
const ENV_VAR: &str = "BOOKSTORE_ENV";

/// Bookstore backend: avatar uploads, profiles, and the dev proxy
#[derive(Debug, Parser)]
#[command(name = "bookstore", version, about, long_about = None)]
pub struct Cli {
    /// Path to a single configuration file (skips the default + overlay merge)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the API server
    Serve(serve::ServeArgs),
    /// Start the development reverse proxy
    DevProxy(dev_proxy::DevProxyArgs),
    /// Access token utilities
    Token(token::TokenArgs),
    /// User management
    User(user::UserArgs),
    /// Configuration management
    Config(config::ConfigArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config_path = self.config.as_deref();
        match &self.command {
            Commands::Serve(args) => serve::execute(args, config_path).await,
            Commands::DevProxy(args) => dev_proxy::execute(args, config_path).await,
            Commands::Token(args) => token::execute(args, config_path, self.format).await,
            Commands::User(args) => user::execute(args, config_path, self.format).await,
            Commands::Config(args) => config::execute(args, config_path, self.format).await,
        }
    }
}

/// Helper: load configuration from an explicit file, or from
/// `config/default.toml` plus the `BOOKSTORE_ENV` overlay.
pub fn load_config(config_path: Option<&str>) -> Result<AppConfig, AppError> {
    match config_path {
        Some(path) => AppConfig::load_from(path),
        None => {
            let env = std::env::var(ENV_VAR).unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}
