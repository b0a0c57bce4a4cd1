//! Avatar ingest and profile reference updates.

use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use bookstore_core::config::AvatarStorageConfig;
use bookstore_core::error::{AppError, ErrorKind};
use bookstore_core::result::AppResult;
use bookstore_core::traits::storage::ByteStream;
use bookstore_core::types::UserId;
use bookstore_database::DynUserRepository;
use bookstore_entity::user::User;
use bookstore_storage::{AvatarStore, StoredAvatar};

use crate::context::RequestContext;

/// Content type sent by clients that do not know what they are uploading.
const OCTET_STREAM: &str = "application/octet-stream";

/// Optional restrictions applied to incoming avatar files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvatarPolicy {
    /// Accepted MIME types, lowercase. `type/*` accepts a whole family.
    /// Empty accepts everything.
    pub allowed_types: Vec<String>,
    /// Largest accepted file, in bytes.
    pub max_bytes: Option<u64>,
}

impl AvatarPolicy {
    /// Build the policy from avatar storage configuration.
    pub fn from_config(config: &AvatarStorageConfig) -> Self {
        Self {
            allowed_types: config
                .allowed_types
                .iter()
                .map(|t| t.trim().to_ascii_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            max_bytes: config.max_bytes,
        }
    }

    /// Reject the upload unless its content type is allowed.
    ///
    /// The declared part type is used when present and specific; otherwise
    /// the type is guessed from the original filename.
    pub fn check_content_type(
        &self,
        original_filename: &str,
        declared: Option<&str>,
    ) -> AppResult<()> {
        if self.allowed_types.is_empty() {
            return Ok(());
        }

        let effective = effective_content_type(original_filename, declared).ok_or_else(|| {
            AppError::unsupported_media_type(format!(
                "Could not determine the content type of '{original_filename}'"
            ))
        })?;

        if self.allowed_types.iter().any(|allowed| type_matches(allowed, &effective)) {
            Ok(())
        } else {
            Err(AppError::unsupported_media_type(format!(
                "Content type '{effective}' is not accepted; allowed: {}",
                self.allowed_types.join(", ")
            )))
        }
    }
}

fn effective_content_type(original_filename: &str, declared: Option<&str>) -> Option<String> {
    let declared = declared
        .and_then(|d| d.split(';').next())
        .map(|d| d.trim().to_ascii_lowercase())
        .filter(|d| !d.is_empty() && d != OCTET_STREAM);

    declared.or_else(|| {
        mime_guess::from_path(original_filename)
            .first()
            .map(|m| m.essence_str().to_ascii_lowercase())
    })
}

fn type_matches(allowed: &str, actual: &str) -> bool {
    match allowed.strip_suffix("/*") {
        Some(family) => actual
            .split_once('/')
            .is_some_and(|(top, _)| top == family),
        None => allowed == actual,
    }
}

/// A single file part received for an avatar upload.
pub struct AvatarUpload {
    /// Filename supplied by the client.
    pub original_filename: String,
    /// Content type declared on the part, if any.
    pub content_type: Option<String>,
    /// File contents.
    pub stream: ByteStream,
}

impl fmt::Debug for AvatarUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarUpload")
            .field("original_filename", &self.original_filename)
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Stores profile pictures and records their URL on the owning user.
#[derive(Debug, Clone)]
pub struct AvatarService {
    /// User record store.
    user_repo: DynUserRepository,
    /// On-disk avatar store.
    store: Arc<AvatarStore>,
    /// Upload restrictions.
    policy: AvatarPolicy,
}

impl AvatarService {
    /// Creates a new avatar service.
    pub fn new(
        user_repo: DynUserRepository,
        store: Arc<AvatarStore>,
        policy: AvatarPolicy,
    ) -> Self {
        Self {
            user_repo,
            store,
            policy,
        }
    }

    /// Creates a service whose store and policy come from `config`.
    pub fn from_config(user_repo: DynUserRepository, config: &AvatarStorageConfig) -> Self {
        Self::new(
            user_repo,
            Arc::new(AvatarStore::new(config)),
            AvatarPolicy::from_config(config),
        )
    }

    /// The underlying avatar store.
    pub fn store(&self) -> &AvatarStore {
        &self.store
    }

    /// Validate and write an upload for `user_id`, replacing that user's
    /// previous file of the same extension. The user record is not touched.
    pub async fn ingest_avatar(
        &self,
        user_id: &UserId,
        upload: AvatarUpload,
    ) -> AppResult<StoredAvatar> {
        self.policy
            .check_content_type(&upload.original_filename, upload.content_type.as_deref())?;

        self.store
            .save(
                user_id,
                &upload.original_filename,
                upload.stream,
                self.policy.max_bytes,
            )
            .await
    }

    /// Point the user's `avatar` at `url` and persist the record.
    ///
    /// The file behind `url` is never removed here, even when saving fails.
    pub async fn update_reference(&self, user_id: &UserId, url: &str) -> AppResult<User> {
        let mut user = self.find_user(user_id).await?;
        user.set_avatar(url);

        let saved = self.user_repo.update(&user).await.map_err(|e| {
            if e.kind == ErrorKind::NotFound {
                return e;
            }
            error!(
                user_id = %user_id,
                url,
                error = %e,
                "Avatar file stored but user record could not be saved"
            );
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to save avatar for user {user_id}"),
                e,
            )
        })?;

        info!(user_id = %user_id, url, "Avatar reference updated");
        Ok(saved)
    }

    /// Full upload flow for the calling user: ingest the file, then record
    /// its public URL. Returns that URL.
    pub async fn upload(&self, ctx: &RequestContext, upload: AvatarUpload) -> AppResult<String> {
        // Unknown principals are rejected before anything reaches the disk.
        self.find_user(&ctx.user_id).await?;

        let stored = self.ingest_avatar(&ctx.user_id, upload).await?;
        let user = self.update_reference(&ctx.user_id, &stored.public_url).await?;

        Ok(user.avatar.unwrap_or(stored.public_url))
    }

    async fn find_user(&self, user_id: &UserId) -> AppResult<User> {
        self.user_repo
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("User {user_id} not found")))
    }
}
