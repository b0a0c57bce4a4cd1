//! # bookstore-service
//!
//! Business logic service layer for the bookstore backend. Services receive
//! their collaborators at construction time as `Arc` handles and are shared
//! across request handlers.

pub mod context;
pub mod user;

pub use context::RequestContext;
pub use user::{AvatarPolicy, AvatarService, AvatarUpload, UserService};
