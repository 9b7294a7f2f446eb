//! Admin preferences API

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/preferences", get(handler::get).put(handler::update))
        .route(
            "/api/preferences/dark-mode/toggle",
            post(handler::toggle_dark_mode),
        )
        .route(
            "/api/preferences/hide-out-of-stock/toggle",
            post(handler::toggle_hide_out_of_stock),
        )
}
