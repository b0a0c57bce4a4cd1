//! # bookstore-database
//!
//! User record store for the bookstore backend: PostgreSQL connection
//! management, migrations, and the concrete repository implementations
//! behind [`Repository<User, UserId>`].

pub mod connection;
pub mod repositories;

use std::sync::Arc;

use tracing::info;

use bookstore_core::config::{DatabaseConfig, DatabaseProvider};
use bookstore_core::result::AppResult;
use bookstore_core::traits::Repository;
use bookstore_core::types::UserId;
use bookstore_entity::user::User;

pub use connection::DatabasePool;
pub use repositories::{MemoryUserRepository, UserRepository};

/// Shared handle to whichever user store is configured.
pub type DynUserRepository = Arc<dyn Repository<User, UserId>>;

/// Open the configured user store, running migrations for PostgreSQL when
/// `auto_migrate` is set.
pub async fn open_user_repository(config: &DatabaseConfig) -> AppResult<DynUserRepository> {
    match config.provider {
        DatabaseProvider::Memory => {
            info!("Using in-memory user store; records are lost on restart");
            Ok(Arc::new(MemoryUserRepository::new()))
        }
        DatabaseProvider::Postgres => {
            let pool = DatabasePool::connect(config).await?;
            if config.auto_migrate {
                pool.migrate().await?;
            }
            Ok(Arc::new(UserRepository::new(pool.into_pool())))
        }
    }
}
