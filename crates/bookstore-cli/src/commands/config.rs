//! Configuration management CLI commands.

use std::path::Path;

use clap::{Args, Subcommand};

use bookstore_core::config::AppConfig;
use bookstore_core::error::{AppError, ErrorKind};
use bookstore_database::connection::redact_url;

use crate::output::{self, OutputFormat};

/// Default configuration shipped with the server.
const DEFAULT_CONFIG: &str = include_str!("../../../../config/default.toml");

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,
    /// Load and validate the configuration
    Validate,
    /// Write the default configuration file
    Generate {
        /// Output file path
        #[arg(short, long, default_value = "config/generated.toml")]
        output: String,
        /// Overwrite without asking
        #[arg(long)]
        force: bool,
    },
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = redact(super::load_config(config_path)?);
            output::print_item(&config, format);
        }
        ConfigCommand::Validate => {
            let config = super::load_config(config_path)?;
            if let Err(e) = config.validate() {
                output::print_error(&format!("Configuration invalid: {}", e.message));
                return Err(e);
            }
            output::print_success("Configuration is valid");
            output::print_kv("Server", &config.server.bind_address());
            output::print_kv("Database", &format!("{:?}", config.database.provider));
            if !config.database.url.is_empty() {
                output::print_kv("Database URL", &redact_url(&config.database.url));
            }
            output::print_kv("Avatar dir", &config.storage.avatars.root_dir);
            output::print_kv("Avatar URL", &config.storage.avatars.normalized_prefix());
            output::print_kv("Dev proxy", &config.dev_proxy.bind_address());
        }
        ConfigCommand::Generate {
            output: out_path,
            force,
        } => {
            if !force && Path::new(out_path).exists() {
                let overwrite = dialoguer::Confirm::new()
                    .with_prompt(format!("'{out_path}' exists. Overwrite?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;
                if !overwrite {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            if let Some(parent) = Path::new(out_path).parent() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Failed to create directory", e)
                })?;
            }

            tokio::fs::write(out_path, DEFAULT_CONFIG)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Internal, "Failed to write config", e)
                })?;

            output::print_success(&format!("Default config written to '{out_path}'"));
        }
    }

    Ok(())
}

/// Mask credentials before printing.
fn redact(mut config: AppConfig) -> AppConfig {
    config.database.url = redact_url(&config.database.url);
    if !config.auth.jwt_secret.is_empty() {
        config.auth.jwt_secret = "****".to_string();
    }
    config
}
