//! Core type definitions used across the bookstore workspace.

pub mod id;

pub use id::UserId;
