//! Order Status API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::error::AppResult;
use shared::models::{OrderStatus, OrderStatusCreate, OrderStatusUpdate};

use crate::state::AppState;

/// GET /api/order-statuses
pub async fn list(State(state): State<AppState>) -> Json<Vec<OrderStatus>> {
    Json(state.lookups.list_order_statuses())
}

/// GET /api/order-statuses/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderStatus>> {
    Ok(Json(state.lookups.get_order_status(id)?))
}

/// POST /api/order-statuses
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<OrderStatusCreate>,
) -> AppResult<Json<OrderStatus>> {
    Ok(Json(state.lookups.create_order_status(payload).await?))
}

/// PUT /api/order-statuses/:id - renames are carried onto orders
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusUpdate>,
) -> AppResult<Json<OrderStatus>> {
    Ok(Json(state.lookups.update_order_status(id, payload).await?))
}

/// DELETE /api/order-statuses/:id - refused while orders use it
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.lookups.delete_order_status(id).await?;
    Ok(Json(true))
}
