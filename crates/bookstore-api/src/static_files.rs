//! Public URL mapping for the avatar directory.

use std::path::PathBuf;

use axum::Router;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::middleware::{self as axum_middleware, Next};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use tower_http::services::ServeDir;

use bookstore_core::config::AvatarStorageConfig;

/// Serve `root_dir` under `public_prefix`, byte for byte.
///
/// Relative roots are anchored to the working directory exactly as the
/// storage resolver anchors them, so the URL recorded on a user always
/// names a file this router can reach.
pub fn avatar_routes<S>(config: &AvatarStorageConfig) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let root = std::path::absolute(&config.root_dir)
        .unwrap_or_else(|_| PathBuf::from(&config.root_dir));

    Router::new()
        .nest_service(
            &config.normalized_prefix(),
            ServeDir::new(root).append_index_html_on_directories(false),
        )
        .layer(axum_middleware::from_fn(hide_dotfiles))
}

/// In-progress uploads are staged under dot-prefixed names; never expose
/// them. Segments are checked after decoding, as `ServeDir` sees them.
async fn hide_dotfiles(request: Request, next: Next) -> Response {
    let hidden = request
        .uri()
        .path()
        .split('/')
        .any(|segment| percent_decode_str(segment).decode_utf8_lossy().starts_with('.'));
    if hidden {
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}
