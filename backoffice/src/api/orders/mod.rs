//! Order API
//!
//! | Path | Method | |
//! |------|--------|-|
//! | /api/orders | GET, POST, DELETE | list, create, delete all |
//! | /api/orders/{id} | GET, PUT, DELETE | |
//! | /api/orders/{id}/status | PUT | change status |
//! | /api/orders/{id}/available-stock | GET | stock the edit form may allocate |

mod handler;

use axum::{
    Router,
    routing::{get, put},
};

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handler::list)
                .post(handler::create)
                .delete(handler::delete_all),
        )
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/status", put(handler::change_status))
        .route("/{id}/available-stock", get(handler::available_stock))
}
