//! API routes
//!
//! - [`health`] - health check (public)
//! - [`auth`] - login, current user, logout
//! - [`products`] - catalog CRUD, bulk operations, images
//! - [`orders`] - orders with stock reconciliation
//! - [`categories`], [`subcategories`], [`brands`], [`labels`],
//!   [`order_statuses`], [`carousel_states`] - lookup tables
//! - [`settings`] - store settings
//! - [`preferences`] - admin preferences
//! - [`data_transfer`] - product CSV import/export

use axum::Router;
use axum::response::IntoResponse;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use shared::error::{AppError, ErrorCode};

use crate::state::AppState;

pub mod auth;
pub mod health;

pub mod brands;
pub mod carousel_states;
pub mod categories;
pub mod data_transfer;
pub mod labels;
pub mod order_statuses;
pub mod orders;
pub mod preferences;
pub mod products;
pub mod settings;
pub mod subcategories;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request ID generator (uuid v4)
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// JSON 404 for unknown routes
async fn not_found(uri: http::Uri) -> impl IntoResponse {
    AppError::with_message(ErrorCode::NotFound, format!("No route for {}", uri.path()))
}

/// Router with every route registered (no middleware)
pub fn build_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(products::router())
        .merge(orders::router())
        .merge(categories::router())
        .merge(subcategories::router())
        .merge(brands::router())
        .merge(labels::router())
        .merge(order_statuses::router())
        .merge(carousel_states::router())
        .merge(settings::router())
        .merge(preferences::router())
        .merge(data_transfer::router())
        .fallback(not_found)
}

/// Fully configured application: routes, auth and the HTTP middleware stack
pub fn build_app(state: &AppState) -> Router<AppState> {
    build_router()
        // Auth runs closest to the routes, after the request id is assigned
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::auth::require_auth,
        ))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
}
