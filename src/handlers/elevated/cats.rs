// handlers/elevated/cats.rs - admin cat endpoints

use axum::{
    extract::{rejection::JsonRejection, rejection::PathRejection, Path, State},
    Extension, Json,
};
use uuid::Uuid;

use crate::auth::Principal;
use crate::database::models::{CatOutput, CatUpdate};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// PUT /api/v1/cats/admin/:id - update any cat, including its owner
pub async fn cat_admin_update(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CatUpdate>, JsonRejection>,
) -> ApiResult<CatOutput> {
    let Path(id) = id?;
    let Json(update) = payload?;
    let service = state.cats();
    let cat = service.admin_update(&principal, id, update).await?;
    Ok(ApiResponse::success(service.present_one(&cat).await?).with_message("Cat modified"))
}

/// DELETE /api/v1/cats/admin/:id - delete any cat
pub async fn cat_admin_delete(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CatOutput> {
    let Path(id) = id?;
    let cat = state.cats().admin_delete(&principal, id).await?;
    Ok(ApiResponse::success(cat.output(None)).with_message("Cat deleted"))
}
