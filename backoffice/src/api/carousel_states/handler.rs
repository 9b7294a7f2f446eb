//! Carousel State API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::error::AppResult;
use shared::models::{
    ProductCarouselState, ProductCarouselStateCreate, ProductCarouselStateUpdate,
};

use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Json<Vec<ProductCarouselState>> {
    Json(state.lookups.list_carousel_states())
}

pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ProductCarouselState>> {
    Ok(Json(state.lookups.get_carousel_state(id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ProductCarouselStateCreate>,
) -> AppResult<Json<ProductCarouselState>> {
    Ok(Json(state.lookups.create_carousel_state(payload).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductCarouselStateUpdate>,
) -> AppResult<Json<ProductCarouselState>> {
    Ok(Json(state.lookups.update_carousel_state(id, payload).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.lookups.delete_carousel_state(id).await?;
    Ok(Json(true))
}
