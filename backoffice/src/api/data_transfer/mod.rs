//! Data Transfer API - product CSV export/import
//!
//! - GET /api/data-transfer/products.csv → CSV of every product
//! - POST /api/data-transfer/import → CSV body, one product per data row

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/data-transfer/products.csv", get(handler::export))
        .route("/api/data-transfer/import", post(handler::import))
}
