//! User self-service handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::UserResponse;
use crate::error::ApiResult;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<UserResponse>> {
    let user = state.user_service.get_profile(&auth).await?;
    Ok(Json(user.into()))
}
