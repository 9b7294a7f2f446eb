//! Category API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::error::AppResult;
use shared::models::{CategoryCreate, CategoryTree, CategoryUpdate, Subcategory};

use crate::state::AppState;

/// GET /api/categories
pub async fn list(State(state): State<AppState>) -> Json<Vec<CategoryTree>> {
    Json(state.lookups.list_categories())
}

/// GET /api/categories/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CategoryTree>> {
    Ok(Json(state.lookups.get_category(id)?))
}

/// GET /api/categories/:id/subcategories
pub async fn list_subcategories(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Vec<Subcategory>>> {
    Ok(Json(state.lookups.get_category(id)?.subcategories))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<CategoryCreate>,
) -> AppResult<Json<CategoryTree>> {
    Ok(Json(state.lookups.create_category(payload).await?))
}

/// PUT /api/categories/:id - renames are carried onto products
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<CategoryUpdate>,
) -> AppResult<Json<CategoryTree>> {
    Ok(Json(state.lookups.update_category(id, payload).await?))
}

/// DELETE /api/categories/:id - also deletes its subcategories
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.lookups.delete_category(id).await?;
    Ok(Json(true))
}
