//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use bookstore_core::types::UserId;

use super::role::UserRole;

/// A registered customer or administrator of the bookstore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// User role.
    pub role: UserRole,
    /// Public-relative URL of the profile picture, if one was uploaded.
    pub avatar: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new user record from creation data, stamping timestamps.
    pub fn new(data: CreateUser) -> Self {
        let now = Utc::now();
        Self {
            id: data.id.unwrap_or_else(UserId::generate),
            name: data.name,
            email: data.email,
            role: data.role,
            avatar: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Point the profile picture at `url` and bump `updated_at`.
    pub fn set_avatar(&mut self, url: impl Into<String>) {
        self.avatar = Some(url.into());
        self.updated_at = Utc::now();
    }

    /// Check if this user has admin privileges.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Explicit identifier; a random one is generated when absent.
    pub id: Option<UserId>,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Assigned role.
    pub role: UserRole,
}
