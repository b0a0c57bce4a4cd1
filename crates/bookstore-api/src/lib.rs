//! # bookstore-api
//!
//! HTTP API layer for the bookstore backend built on Axum.
//!
//! Provides the avatar upload and profile endpoints, the static mapping that
//! serves stored avatars, the development reverse proxy, middleware,
//! extractors, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod proxy;
pub mod router;
pub mod state;
pub mod static_files;

pub use app::{build_app, run_server};
pub use proxy::{DevProxy, ProxyRule, run_dev_proxy};
pub use state::AppState;
