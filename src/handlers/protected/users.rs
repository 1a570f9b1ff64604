// handlers/protected/users.rs - endpoints acting on the current user

use axum::{
    extract::{rejection::JsonRejection, State},
    Extension, Json,
};

use crate::auth::Principal;
use crate::database::models::{UserOutput, UserUpdate};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/v1/users/token - the user behind the bearer token
pub async fn user_token(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<UserOutput> {
    let user = state.users().current(&principal).await?;
    Ok(ApiResponse::success(user.output()))
}

/// PUT /api/v1/users - update the current user
pub async fn user_update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<UserUpdate>, JsonRejection>,
) -> ApiResult<UserOutput> {
    let Json(update) = payload?;
    let user = state.users().update_current(&principal, update).await?;
    Ok(ApiResponse::success(user.output()).with_message("User modified"))
}

/// DELETE /api/v1/users - delete the current user and their cats
pub async fn user_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<UserOutput> {
    let user = state.users().delete_current(&principal).await?;
    Ok(ApiResponse::success(user.output()).with_message("User deleted"))
}
