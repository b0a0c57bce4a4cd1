//! Destination directory resolution for avatar uploads.

use std::path::PathBuf;

use tokio::fs;
use tracing::debug;

use bookstore_core::error::{AppError, ErrorKind};
use bookstore_core::result::AppResult;

/// Resolves the configured avatar root to an absolute, existing directory.
#[derive(Debug, Clone)]
pub struct StorageResolver {
    root: PathBuf,
}

impl StorageResolver {
    /// Create a resolver for `root`. Relative roots are interpreted against
    /// the process working directory at resolution time.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Return the absolute avatar directory, creating it and any missing
    /// ancestors first. Calling this when the directory already exists does
    /// nothing beyond the existence check.
    pub async fn resolve(&self) -> AppResult<PathBuf> {
        let dir = std::path::absolute(&self.root).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to resolve avatar directory: {}", self.root.display()),
                e,
            )
        })?;

        match fs::metadata(&dir).await {
            Ok(meta) if meta.is_dir() => return Ok(dir),
            Ok(_) => {
                return Err(AppError::storage(format!(
                    "Avatar path exists but is not a directory: {}",
                    dir.display()
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to inspect avatar directory: {}", dir.display()),
                    e,
                ));
            }
        }

        fs::create_dir_all(&dir).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to create avatar directory: {}", dir.display()),
                e,
            )
        })?;
        debug!(dir = %dir.display(), "Created avatar directory");
        Ok(dir)
    }
}
