//! Avatar storage pipeline: resolve the directory, derive the name, write.

pub mod filename;
pub mod resolver;
pub mod store;

pub use filename::derive_filename;
pub use resolver::StorageResolver;
pub use store::{AvatarStore, StoredAvatar};
