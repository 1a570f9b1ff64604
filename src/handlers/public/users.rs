// handlers/public/users.rs - public user endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Json,
};
use uuid::Uuid;

use crate::database::models::{NewUser, UserOutput};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/v1/users - list all users
pub async fn user_list(State(state): State<AppState>) -> ApiResult<Vec<UserOutput>> {
    let users = state.users().list().await?;
    Ok(ApiResponse::success(users.iter().map(|u| u.output()).collect()))
}

/// POST /api/v1/users - register a new account
pub async fn user_register(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> ApiResult<UserOutput> {
    let Json(input) = payload?;
    let user = state.users().register(input).await?;
    Ok(ApiResponse::created(user.output()).with_message("User created"))
}

/// GET /api/v1/users/:id - show a single user
pub async fn user_show(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<UserOutput> {
    let Path(id) = id?;
    let user = state.users().get(id).await?;
    Ok(ApiResponse::success(user.output()))
}
