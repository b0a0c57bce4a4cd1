//! Route handlers organized by domain.

pub mod avatar;
pub mod health;
pub mod user;
