//! Avatar upload handler.

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;

use bookstore_core::error::AppError;
use bookstore_core::result::AppResult;
use bookstore_core::traits::storage::ByteStream;
use bookstore_service::AvatarUpload;

use crate::dto::response::{AvatarResponse, MessageResponse};
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Message returned when a request carries no file part.
pub const NO_FILE_MESSAGE: &str = "No se subió ningún archivo";

/// A file part read from the request.
struct ReceivedFile {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

/// POST /api/users/avatar
///
/// Accepts a multipart body with exactly one file part. Text parts are
/// ignored. Responds with the stored avatar's public URL.
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let mut multipart = multipart.map_err(|e| {
        AppError::validation(format!("Invalid multipart request: {}", e.body_text()))
    })?;

    let Some(file) = read_single_file(&mut multipart).await? else {
        return Ok((
            StatusCode::BAD_REQUEST,
            Json(MessageResponse::new(NO_FILE_MESSAGE)),
        )
            .into_response());
    };

    let data = file.data;
    let stream: ByteStream = Box::pin(futures::stream::once(async move {
        Ok::<_, std::io::Error>(data)
    }));

    let url = state
        .avatar_service
        .upload(
            &auth,
            AvatarUpload {
                original_filename: file.filename,
                content_type: file.content_type,
                stream,
            },
        )
        .await?;

    Ok(Json(AvatarResponse { avatar: url }).into_response())
}

/// Read the whole body, returning the only file part if there is one.
///
/// A part counts as a file when it carries a non-empty filename. The body
/// is consumed completely before anything is written, so a request with a
/// second file part is rejected without side effects.
async fn read_single_file(multipart: &mut Multipart) -> AppResult<Option<ReceivedFile>> {
    let mut received: Option<ReceivedFile> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(filename) = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
        else {
            continue;
        };

        if received.is_some() {
            return Err(AppError::validation("Only one file may be uploaded"));
        }

        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(multipart_error)?;
        received = Some(ReceivedFile {
            filename,
            content_type,
            data,
        });
    }

    Ok(received)
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::payload_too_large(format!("Request body too large: {}", e.body_text()))
    } else {
        AppError::validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}
