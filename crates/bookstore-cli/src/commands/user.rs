//! User management CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use bookstore_core::config::DatabaseProvider;
use bookstore_core::error::AppError;
use bookstore_core::traits::Repository;
use bookstore_core::types::UserId;
use bookstore_entity::user::{CreateUser, User, UserRole};
use bookstore_service::UserService;

use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// Create a user
    Create {
        /// Explicit id; generated when omitted
        #[arg(long)]
        id: Option<String>,
        /// Display name
        #[arg(long)]
        name: String,
        /// Email address
        #[arg(long)]
        email: String,
        /// Role
        #[arg(long, default_value = "customer")]
        role: String,
    },
    /// Show a user and its current avatar URL
    Show {
        /// User id
        id: String,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Name
    name: String,
    /// Email
    email: String,
    /// Role
    role: String,
    /// Avatar URL
    avatar: String,
    /// Last updated
    updated_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            name: u.name.clone(),
            email: u.email.clone(),
            role: u.role.to_string(),
            avatar: u.avatar.clone().unwrap_or_else(|| "-".to_string()),
            updated_at: u.updated_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(
    args: &UserArgs,
    config_path: Option<&str>,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    if config.database.provider == DatabaseProvider::Memory {
        return Err(AppError::configuration(
            "User commands need a persistent store; set database.provider = \"postgres\"",
        ));
    }
    let user_repo = bookstore_database::open_user_repository(&config.database).await?;

    match &args.command {
        UserCommand::Create {
            id,
            name,
            email,
            role,
        } => {
            let id = id.as_deref().map(UserId::parse).transpose()?;
            let role: UserRole = role.parse()?;
            let user = UserService::new(user_repo)
                .create_user(CreateUser {
                    id,
                    name: name.clone(),
                    email: email.clone(),
                    role,
                })
                .await?;

            output::print_success(&format!("User '{}' created", user.id));
            output::print_list(&[UserRow::from(&user)], format);
        }
        UserCommand::Show { id } => {
            let id = UserId::parse(id.as_str())?;
            let user = user_repo
                .find_by_id(&id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("User '{id}' not found")))?;

            output::print_list(&[UserRow::from(&user)], format);
        }
    }

    Ok(())
}
