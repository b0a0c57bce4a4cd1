//! Storage configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Profile avatar storage.
    #[serde(default)]
    pub avatars: AvatarStorageConfig,
}

/// Where avatars live on disk, how they are exposed, and what is accepted.
///
/// `allowed_types` and `max_bytes` are off by default: any content type and
/// any size (up to the server body limit) is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvatarStorageConfig {
    /// Directory receiving avatar files. Relative paths resolve against the
    /// process working directory.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,
    /// Public URL prefix under which `root_dir` is served.
    #[serde(default = "default_public_prefix")]
    pub public_prefix: String,
    /// Accepted MIME types. Empty means no restriction.
    #[serde(default)]
    pub allowed_types: Vec<String>,
    /// Maximum accepted file size in bytes.
    #[serde(default)]
    pub max_bytes: Option<u64>,
    /// Upper bound on the time spent writing one upload to disk.
    #[serde(default = "default_write_timeout")]
    pub write_timeout_seconds: u64,
}

impl Default for AvatarStorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            public_prefix: default_public_prefix(),
            allowed_types: Vec::new(),
            max_bytes: None,
            write_timeout_seconds: default_write_timeout(),
        }
    }
}

impl AvatarStorageConfig {
    /// Build a configuration rooted at `root_dir` with every other field at
    /// its default.
    pub fn with_root(root_dir: impl Into<String>) -> Self {
        Self {
            root_dir: root_dir.into(),
            ..Self::default()
        }
    }

    /// The write timeout as a [`Duration`].
    pub fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.write_timeout_seconds)
    }

    /// The public prefix without a trailing slash, always starting with `/`.
    pub fn normalized_prefix(&self) -> String {
        let trimmed = self.public_prefix.trim_matches('/');
        format!("/{trimmed}")
    }
}

fn default_root_dir() -> String {
    "uploads/avatars".to_string()
}

fn default_public_prefix() -> String {
    "/uploads/avatars".to_string()
}

fn default_write_timeout() -> u64 {
    30
}
