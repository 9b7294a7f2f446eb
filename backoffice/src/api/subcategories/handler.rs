//! Subcategory API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use shared::error::AppResult;
use shared::models::{Subcategory, SubcategoryCreate, SubcategoryUpdate};

use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SubcategoryQuery {
    pub category_id: Option<i64>,
}

/// GET /api/subcategories?category_id=
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<SubcategoryQuery>,
) -> Json<Vec<Subcategory>> {
    Json(state.lookups.list_subcategories(query.category_id))
}

/// GET /api/subcategories/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Subcategory>> {
    Ok(Json(state.lookups.get_subcategory(id)?))
}

/// POST /api/subcategories
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<SubcategoryCreate>,
) -> AppResult<Json<Subcategory>> {
    Ok(Json(state.lookups.create_subcategory(payload).await?))
}

/// PUT /api/subcategories/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SubcategoryUpdate>,
) -> AppResult<Json<Subcategory>> {
    Ok(Json(state.lookups.update_subcategory(id, payload).await?))
}

/// DELETE /api/subcategories/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.lookups.delete_subcategory(id).await?;
    Ok(Json(true))
}
