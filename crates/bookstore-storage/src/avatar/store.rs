//! Streaming avatar writes into the resolved directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use futures::stream::StreamExt;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use tracing::{debug, info, warn};
use uuid::Uuid;

use bookstore_core::config::AvatarStorageConfig;
use bookstore_core::error::AppError;
use bookstore_core::result::AppResult;
use bookstore_core::traits::storage::{ByteStream, StorageProvider};
use bookstore_core::types::UserId;

use super::filename::derive_filename;
use super::resolver::StorageResolver;
use crate::providers::LocalStorageProvider;

/// Characters left as-is in a URL path segment; everything else is escaped.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Outcome of a successful avatar write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredAvatar {
    /// Absolute directory the file was written into.
    pub directory: PathBuf,
    /// Derived file name, `<user-id><ext>`.
    pub filename: String,
    /// Public-relative URL the file is served under.
    pub public_url: String,
    /// Bytes written.
    pub size_bytes: u64,
}

impl StoredAvatar {
    /// Full on-disk path of the stored file.
    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

/// Writes avatars under the configured root, one file per user.
///
/// Incoming bytes go to a uniquely named staging file which is renamed over
/// `<user-id><ext>` only once the write has completed and been synced. A
/// failed, oversized, or timed-out upload therefore leaves any previous
/// avatar untouched. Concurrent uploads for the same user each stage
/// separately and the last rename wins.
#[derive(Debug, Clone)]
pub struct AvatarStore {
    resolver: StorageResolver,
    public_prefix: String,
    write_timeout: Duration,
}

impl AvatarStore {
    /// Create a store from the avatar storage configuration.
    pub fn new(config: &AvatarStorageConfig) -> Self {
        Self {
            resolver: StorageResolver::new(&config.root_dir),
            public_prefix: config.normalized_prefix(),
            write_timeout: config.write_timeout(),
        }
    }

    /// The directory resolver backing this store.
    pub fn resolver(&self) -> &StorageResolver {
        &self.resolver
    }

    /// Public URL for a stored file name. The name is escaped as a single
    /// path segment, so the static mapping decodes it back to the on-disk
    /// name.
    pub fn public_url(&self, filename: &str) -> String {
        format!(
            "{}/{}",
            self.public_prefix,
            utf8_percent_encode(filename, SEGMENT)
        )
    }

    /// Stream an upload into `<root>/<user-id><ext>`, replacing any existing
    /// avatar of that user.
    ///
    /// When `max_bytes` is set and the stream grows past it, the write is
    /// abandoned with a payload-too-large error.
    pub async fn save(
        &self,
        user_id: &UserId,
        original_filename: &str,
        stream: ByteStream,
        max_bytes: Option<u64>,
    ) -> AppResult<StoredAvatar> {
        let directory = self.resolver.resolve().await?;
        let provider = LocalStorageProvider::new(&directory);

        let filename = derive_filename(user_id, original_filename);
        let staging = format!(".{filename}.{}.part", Uuid::new_v4().simple());

        let exceeded = Arc::new(AtomicBool::new(false));
        let stream = match max_bytes {
            Some(limit) => limit_stream(stream, limit, Arc::clone(&exceeded)),
            None => stream,
        };

        let written =
            match tokio::time::timeout(self.write_timeout, provider.write_stream(&staging, stream))
                .await
            {
                Ok(Ok(bytes)) => bytes,
                Ok(Err(e)) => {
                    discard(&provider, &staging).await;
                    if exceeded.load(Ordering::Relaxed) {
                        return Err(AppError::payload_too_large(format!(
                            "File exceeds the maximum size of {} bytes",
                            max_bytes.unwrap_or_default()
                        )));
                    }
                    return Err(e);
                }
                Err(_) => {
                    discard(&provider, &staging).await;
                    return Err(AppError::storage(format!(
                        "Writing avatar timed out after {}s",
                        self.write_timeout.as_secs()
                    )));
                }
            };

        if let Err(e) = provider.rename(&staging, &filename).await {
            discard(&provider, &staging).await;
            return Err(e);
        }

        info!(
            user_id = %user_id,
            file = %filename,
            bytes = written,
            "Stored avatar"
        );

        Ok(StoredAvatar {
            public_url: self.public_url(&filename),
            directory,
            filename,
            size_bytes: written,
        })
    }
}

/// Best-effort removal of a staging file after a failed write.
async fn discard(provider: &LocalStorageProvider, staging: &str) {
    if let Err(e) = provider.delete(staging).await {
        warn!(file = staging, error = %e, "Failed to remove staging file");
    } else {
        debug!(file = staging, "Removed staging file");
    }
}

/// Pass chunks through until more than `limit` bytes have been seen, then
/// flag `exceeded` and fail the stream.
fn limit_stream(stream: ByteStream, limit: u64, exceeded: Arc<AtomicBool>) -> ByteStream {
    let mut seen = 0u64;
    Box::pin(stream.map(move |chunk| {
        let chunk = chunk?;
        seen += chunk.len() as u64;
        if seen > limit {
            exceeded.store(true, Ordering::Relaxed);
            return Err(std::io::Error::other(format!(
                "upload exceeds {limit} bytes"
            )));
        }
        Ok(chunk)
    }))
}
