//! Access token CLI commands.

use clap::{Args, Subcommand};

use bookstore_auth::JwtEncoder;
use bookstore_core::error::AppError;
use bookstore_core::types::UserId;
use bookstore_entity::user::UserRole;

use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Sign an access token for a user id
    Issue {
        /// User id placed in the `sub` claim
        user_id: String,
        /// Role claim
        #[arg(short, long, default_value = "customer")]
        role: String,
        /// Display name claim
        #[arg(short, long, default_value = "")]
        name: String,
    },
}

/// Execute token commands
pub async fn execute(
    args: &TokenArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    match &args.command {
        TokenCommand::Issue {
            user_id,
            role,
            name,
        } => {
            let user_id = UserId::parse(user_id.as_str())?;
            let role: UserRole = role.parse()?;
            let encoder = JwtEncoder::new(&config.auth);
            let token = encoder.generate_access_token(&user_id, role, name)?;

            match format {
                OutputFormat::Json => output::print_item(&token, format),
                OutputFormat::Table => {
                    output::print_kv("User", user_id.as_str());
                    output::print_kv("Role", role.as_str());
                    output::print_kv("Expires", &token.expires_at.to_rfc3339());
                    println!("{}", token.access_token);
                }
            }
        }
    }

    Ok(())
}
