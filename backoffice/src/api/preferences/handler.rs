use axum::{Json, extract::State};

use shared::error::AppResult;
use shared::models::{Preferences, PreferencesUpdate};

use crate::state::AppState;

pub async fn get(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.preferences.get())
}

pub async fn update(
    State(state): State<AppState>,
    Json(payload): Json<PreferencesUpdate>,
) -> AppResult<Json<Preferences>> {
    Ok(Json(state.preferences.update(payload).await?))
}

pub async fn toggle_dark_mode(State(state): State<AppState>) -> AppResult<Json<Preferences>> {
    Ok(Json(state.preferences.toggle_dark_mode().await?))
}

pub async fn toggle_hide_out_of_stock(
    State(state): State<AppState>,
) -> AppResult<Json<Preferences>> {
    Ok(Json(state.preferences.toggle_hide_out_of_stock().await?))
}
