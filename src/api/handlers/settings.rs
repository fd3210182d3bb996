use axum::{extract::State, response::IntoResponse, Json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::responses::SettingsResponse;
use crate::api::extractors::actor::AuthActor;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_settings(
    State(state): State<Arc<AppState>>,
    _actor: AuthActor,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(SettingsResponse {
        site: state.settings.site_settings().await?,
        settings: state.settings.all().await?,
    }))
}

pub async fn update_settings(
    State(state): State<Arc<AppState>>,
    AuthActor(actor): AuthActor,
    Json(payload): Json<BTreeMap<String, String>>,
) -> Result<impl IntoResponse, AppError> {
    state.settings.update(&payload).await?;
    info!("Settings updated by {}", actor.id);

    Ok(Json(SettingsResponse {
        site: state.settings.site_settings().await?,
        settings: state.settings.all().await?,
    }))
}
