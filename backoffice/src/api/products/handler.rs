//! Product API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};

use shared::catalog::ProductQuery;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{
    Product, ProductBulkDelete, ProductBulkUpdate, ProductCreate, ProductImageRemove,
    ProductUpdate,
};
use shared::response::{BulkResult, PaginatedResponse};

use crate::state::AppState;

/// GET /api/products - filtered, sorted page
///
/// `hide_out_of_stock` falls back to the saved preference.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> AppResult<Json<PaginatedResponse<Product>>> {
    let hide = state.preferences.get().hide_out_of_stock;
    Ok(Json(state.catalog.list(&query, hide)))
}

/// GET /api/products/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog.get(id)?))
}

/// POST /api/products
pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ProductCreate>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog.create(payload).await?))
}

/// PUT /api/products/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductUpdate>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog.update(id, payload).await?))
}

/// DELETE /api/products/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> AppResult<Json<bool>> {
    state.catalog.delete(id).await?;
    Ok(Json(true))
}

/// POST /api/products/:id/duplicate
pub async fn duplicate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog.duplicate(id).await?))
}

/// POST /api/products/bulk-update
pub async fn bulk_update(
    State(state): State<AppState>,
    Json(payload): Json<ProductBulkUpdate>,
) -> AppResult<Json<BulkResult>> {
    Ok(Json(state.catalog.bulk_update(payload).await?))
}

/// POST /api/products/bulk-delete
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(payload): Json<ProductBulkDelete>,
) -> Json<BulkResult> {
    Json(state.catalog.bulk_delete(payload.ids).await)
}

/// DELETE /api/products
pub async fn delete_all(State(state): State<AppState>) -> Json<BulkResult> {
    Json(state.catalog.delete_all().await)
}

/// POST /api/products/:id/images - multipart, field `file`
pub async fn upload_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<Product>> {
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        AppError::with_message(ErrorCode::InvalidRequest, format!("Multipart error: {e}"))
    })? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(|e| {
            AppError::with_message(ErrorCode::InvalidRequest, format!("Read error: {e}"))
        })?;
        file = Some((filename, data.to_vec()));
        break;
    }

    let (filename, data) = file.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;
    Ok(Json(state.catalog.upload_image(id, &filename, data).await?))
}

/// DELETE /api/products/:id/images - body `{ "url": ... }`
pub async fn remove_image(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductImageRemove>,
) -> AppResult<Json<Product>> {
    Ok(Json(state.catalog.remove_image(id, &payload.url).await?))
}
