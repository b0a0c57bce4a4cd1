//! # bookstore-storage
//!
//! Durable storage for profile avatars. The [`StorageResolver`] owns the
//! destination directory, [`derive_filename`] names the stored file after its
//! owner, and [`AvatarStore`] streams uploads into place through the local
//! filesystem provider.

pub mod avatar;
pub mod providers;

pub use avatar::{AvatarStore, StorageResolver, StoredAvatar, derive_filename};
pub use providers::LocalStorageProvider;
