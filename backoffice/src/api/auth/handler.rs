//! Authentication handlers

use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};

use shared::error::{AppError, AppResult};

use crate::auth::CurrentUser;
use crate::backend::AuthUser;
use crate::error::ServiceError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: AuthUser,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let email = req.email.trim();
    if email.is_empty() || req.password.is_empty() {
        return Err(AppError::validation("email and password are required"));
    }

    let session = state
        .backend
        .sign_in(email, &req.password)
        .await
        .map_err(|e| {
            tracing::warn!(email = %email, error = %e, "Login failed");
            AppError::from(ServiceError::from(e))
        })?;

    tracing::info!(user_id = %session.user.id, "User logged in");
    Ok(Json(LoginResponse {
        token: session.access_token,
        token_type: session.token_type,
        expires_in: session.expires_in,
        user: session.user,
    }))
}

/// GET /api/auth/me
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<CurrentUser> {
    Json(user)
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<bool>> {
    state
        .backend
        .sign_out(&user.token)
        .await
        .map_err(ServiceError::from)?;
    tracing::info!(user_id = %user.id, "User logged out");
    Ok(Json(true))
}
