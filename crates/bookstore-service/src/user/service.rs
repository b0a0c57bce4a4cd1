//! User self-service operations.

use tracing::info;

use bookstore_core::error::AppError;
use bookstore_core::result::AppResult;
use bookstore_database::DynUserRepository;
use bookstore_entity::user::{CreateUser, User};

use crate::context::RequestContext;

/// Handles profile lookups and account provisioning.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User repository.
    user_repo: DynUserRepository,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(user_repo: DynUserRepository) -> Self {
        Self { user_repo }
    }

    /// Gets the current user's full profile.
    pub async fn get_profile(&self, ctx: &RequestContext) -> AppResult<User> {
        self.user_repo
            .find_by_id(&ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// Creates a user record.
    pub async fn create_user(&self, data: CreateUser) -> AppResult<User> {
        if data.name.trim().is_empty() {
            return Err(AppError::validation("Name cannot be empty"));
        }
        if !data.email.contains('@') {
            return Err(AppError::validation("Invalid email format"));
        }

        let user = self.user_repo.create(&User::new(data)).await?;
        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }
}
