//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};

use shared::error::AppResult;
use shared::models::{AvailableStock, Order, OrderCreate, OrderStatusChange, OrderUpdate};
use shared::response::{BulkResult, PaginatedResponse};

use crate::services::{AvailableStockQuery, OrderQuery};
use crate::state::AppState;

/// GET /api/orders - newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<OrderQuery>,
) -> Json<PaginatedResponse<Order>> {
    Json(state.orders.list(&query))
}

/// GET /api/orders/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.get(id)?))
}

/// POST /api/orders
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<OrderCreate>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.create(payload).await?))
}

/// PUT /api/orders/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderUpdate>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.update(id, payload).await?))
}

/// PUT /api/orders/:id/status
pub async fn change_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<OrderStatusChange>,
) -> AppResult<Json<Order>> {
    Ok(Json(state.orders.change_status(id, payload.status_id).await?))
}

/// DELETE /api/orders/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.orders.delete(id).await?;
    Ok(Json(true))
}

/// DELETE /api/orders
pub async fn delete_all(State(state): State<AppState>) -> Json<BulkResult> {
    Json(state.orders.delete_all().await)
}

/// GET /api/orders/:id/available-stock?product_id=
pub async fn available_stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AvailableStockQuery>,
) -> AppResult<Json<Vec<AvailableStock>>> {
    Ok(Json(state.orders.available_stock(id, query.product_id).await?))
}
