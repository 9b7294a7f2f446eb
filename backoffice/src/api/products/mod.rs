//! Product API
//!
//! | Path | Method | |
//! |------|--------|-|
//! | /api/products | GET, POST, DELETE | list (filtered), create, delete all |
//! | /api/products/bulk-update | POST | same changes for many ids |
//! | /api/products/bulk-delete | POST | delete many ids |
//! | /api/products/{id} | GET, PUT, DELETE | |
//! | /api/products/{id}/duplicate | POST | copy with " (copia)" suffix |
//! | /api/products/{id}/images | POST, DELETE | multipart upload, detach by url |

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::services::catalog::MAX_IMAGE_SIZE;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().nest("/api/products", routes())
}

fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handler::list)
                .post(handler::create)
                .delete(handler::delete_all),
        )
        .route("/bulk-update", post(handler::bulk_update))
        .route("/bulk-delete", post(handler::bulk_delete))
        .route(
            "/{id}",
            get(handler::get_by_id)
                .put(handler::update)
                .delete(handler::delete),
        )
        .route("/{id}/duplicate", post(handler::duplicate))
        .route(
            "/{id}/images",
            post(handler::upload_image)
                .delete(handler::remove_image)
                // Multipart framing on top of the largest accepted file
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + 64 * 1024)),
        )
}
