//! Brand API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::error::AppResult;
use shared::models::{Brand, BrandCreate, BrandUpdate};

use crate::state::AppState;

/// GET /api/brands
pub async fn list(State(state): State<AppState>) -> Json<Vec<Brand>> {
    Json(state.lookups.list_brands())
}

/// GET /api/brands/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Brand>> {
    Ok(Json(state.lookups.get_brand(id)?))
}

/// POST /api/brands
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<BrandCreate>,
) -> AppResult<Json<Brand>> {
    Ok(Json(state.lookups.create_brand(payload).await?))
}

/// PUT /api/brands/:id - renames are carried onto products
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<BrandUpdate>,
) -> AppResult<Json<Brand>> {
    Ok(Json(state.lookups.update_brand(id, payload).await?))
}

/// DELETE /api/brands/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.lookups.delete_brand(id).await?;
    Ok(Json(true))
}
