//! Label API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::error::AppResult;
use shared::models::{Label, LabelCreate, LabelUpdate};

use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Json<Vec<Label>> {
    Json(state.lookups.list_labels())
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Label>> {
    Ok(Json(state.lookups.get_label(id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<LabelCreate>,
) -> AppResult<Json<Label>> {
    Ok(Json(state.lookups.create_label(payload).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LabelUpdate>,
) -> AppResult<Json<Label>> {
    Ok(Json(state.lookups.update_label(id, payload).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.lookups.delete_label(id).await?;
    Ok(Json(true))
}
