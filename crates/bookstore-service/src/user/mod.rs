//! User-facing services.

pub mod avatar;
pub mod service;

pub use avatar::{AvatarPolicy, AvatarService, AvatarUpload};
pub use service::UserService;
