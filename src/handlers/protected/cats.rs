// handlers/protected/cats.rs - cat endpoints for the authenticated owner

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{CatOutput, CatUpdate, NewCat};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/v1/cats/user - cats owned by the caller
pub async fn cat_mine(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Vec<CatOutput>> {
    let service = state.cats();
    let cats = service.by_owner(&principal).await?;
    Ok(ApiResponse::success(service.present(&cats).await?))
}

/// POST /api/v1/cats - create a cat owned by the caller
pub async fn cat_create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<NewCat>, JsonRejection>,
) -> ApiResult<CatOutput> {
    let Json(input) = payload?;
    let service = state.cats();
    let cat = service.create(&principal, input).await?;
    Ok(ApiResponse::created(service.present_one(&cat).await?).with_message("Cat created"))
}

/// PUT /api/v1/cats/:id - owner-only update
pub async fn cat_update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CatUpdate>, JsonRejection>,
) -> ApiResult<CatOutput> {
    let Path(id) = id?;
    let Json(update) = payload?;
    let service = state.cats();
    let cat = service.update(&principal, id, update).await?;
    Ok(ApiResponse::success(service.present_one(&cat).await?).with_message("Cat modified"))
}

/// DELETE /api/v1/cats/:id - owner-only delete
pub async fn cat_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CatOutput> {
    let Path(id) = id?;
    let service = state.cats();
    let cat = service.delete(&principal, id).await?;
    Ok(ApiResponse::success(cat.output(None)).with_message("Cat deleted"))
}
