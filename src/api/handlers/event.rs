use axum::{extract::{Path, State}, response::IntoResponse, Json};
use std::sync::Arc;

use crate::api::dtos::responses::PublicEventResponse;
use crate::error::AppError;
use crate::state::AppState;

pub async fn get_site(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.settings.site_settings().await?))
}

pub async fn list_upcoming(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.list_upcoming().await?))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.catalog.get_by_slug(&slug).await?
        .ok_or(AppError::NotFound(format!("Event {} not found", slug)))?;

    let attendees = if event.attendee_list_public {
        let names = state.admission.list_by_event(&event.id).await?
            .into_iter()
            .map(|r| r.name)
            .collect();
        Some(names)
    } else {
        None
    };

    Ok(Json(PublicEventResponse {
        remaining_capacity: event.remaining_capacity(),
        event,
        attendees,
    }))
}
