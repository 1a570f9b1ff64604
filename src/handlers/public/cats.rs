// handlers/public/cats.rs - public cat endpoints

use axum::extract::{rejection::PathRejection, rejection::QueryRejection, Path, Query, State};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::CatOutput;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// Corners of the search rectangle, each `"<lat>,<lng>"`
#[derive(Debug, Deserialize)]
pub struct AreaQuery {
    #[serde(rename = "topRight")]
    pub top_right: Option<String>,
    #[serde(rename = "bottomLeft")]
    pub bottom_left: Option<String>,
}

/// GET /api/v1/cats - list all cats
pub async fn cat_list(State(state): State<AppState>) -> ApiResult<Vec<CatOutput>> {
    let service = state.cats();
    let cats = service.list().await?;
    Ok(ApiResponse::success(service.present(&cats).await?))
}

/// GET /api/v1/cats/area?topRight=lat,lng&bottomLeft=lat,lng
pub async fn cat_area(
    State(state): State<AppState>,
    query: Result<Query<AreaQuery>, QueryRejection>,
) -> ApiResult<Vec<CatOutput>> {
    let Query(query) = query?;
    let top_right = query.top_right.as_deref().unwrap_or_default();
    let bottom_left = query.bottom_left.as_deref().unwrap_or_default();

    let service = state.cats();
    let cats = service.within_area(top_right, bottom_left).await?;
    tracing::debug!("Area query matched {} cats", cats.len());
    Ok(ApiResponse::success(service.present(&cats).await?))
}

/// GET /api/v1/cats/:id - show a single cat
pub async fn cat_show(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<CatOutput> {
    let Path(id) = id?;
    let service = state.cats();
    let cat = service.get(id).await?;
    Ok(ApiResponse::success(service.present_one(&cat).await?))
}
