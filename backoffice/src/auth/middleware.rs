//! Authentication middleware

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use serde::Serialize;

use shared::error::AppError;

use crate::state::AppState;

/// Signed-in admin, available to handlers as `Extension<CurrentUser>`
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUser {
    pub id: String,
    pub email: Option<String>,
    #[serde(skip)]
    pub token: String,
}

/// Token from an `Authorization: Bearer <token>` header value
pub fn extract_bearer(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Require a signed-in user
///
/// Skips authentication for:
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths (health check, 404 fallback)
/// - `/api/auth/login`
///
/// On success the [`CurrentUser`] is inserted into the request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || path == "/api/auth/login" {
        return Ok(next.run(req).await);
    }

    let token = match req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    {
        Some(header) => extract_bearer(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?
            .to_string(),
        None => {
            tracing::warn!(uri = %req.uri(), "Request without credentials");
            return Err(AppError::not_authenticated());
        }
    };

    let user = state.backend.get_user(&token).await.map_err(|e| {
        tracing::debug!(error = %e, "Token rejected");
        AppError::from(crate::error::ServiceError::from(e))
    })?;

    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        email: user.email,
        token,
    });
    Ok(next.run(req).await)
}
