use axum::{Json, extract::State};

use shared::error::AppResult;
use shared::models::{StoreSettings, StoreSettingsUpdate};

use crate::state::AppState;

/// GET /api/settings - defaults until first saved
pub async fn get(State(state): State<AppState>) -> Json<StoreSettings> {
    Json(state.settings.get())
}

/// PUT /api/settings - upsert
pub async fn update(
    State(state): State<AppState>,
    Json(payload): Json<StoreSettingsUpdate>,
) -> AppResult<Json<StoreSettings>> {
    Ok(Json(state.settings.update(payload).await?))
}
