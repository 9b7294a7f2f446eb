//! Data Transfer handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use shared::error::{AppError, AppResult, ErrorCode};
use shared::response::BulkResult;

use crate::state::AppState;

/// GET /api/data-transfer/products.csv
pub async fn export(State(state): State<AppState>) -> impl IntoResponse {
    let csv = state.catalog.export_csv();
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"products.csv\"",
            ),
        ],
        csv,
    )
}

/// POST /api/data-transfer/import
pub async fn import(State(state): State<AppState>, body: Bytes) -> AppResult<Json<BulkResult>> {
    let content = std::str::from_utf8(&body).map_err(|e| {
        AppError::with_message(ErrorCode::InvalidFormat, format!("CSV must be UTF-8: {e}"))
    })?;
    Ok(Json(state.catalog.import_csv(content).await?))
}
