//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use bookstore_auth::JwtDecoder;
use bookstore_core::config::AppConfig;
use bookstore_database::DynUserRepository;
use bookstore_service::{AvatarService, UserService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`. All fields are
/// `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// User record store
    pub user_repo: DynUserRepository,
    /// Avatar ingest and reference updates
    pub avatar_service: Arc<AvatarService>,
    /// Profile reads
    pub user_service: Arc<UserService>,
    /// When this state was built, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    /// Wire services for `config` on top of an already opened user store.
    pub fn new(config: AppConfig, user_repo: DynUserRepository) -> Self {
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let avatar_service = Arc::new(AvatarService::from_config(
            Arc::clone(&user_repo),
            &config.storage.avatars,
        ));
        let user_service = Arc::new(UserService::new(Arc::clone(&user_repo)));

        Self {
            config: Arc::new(config),
            jwt_decoder,
            user_repo,
            avatar_service,
            user_service,
            started_at: Instant::now(),
        }
    }
}
