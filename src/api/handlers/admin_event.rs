use axum::{body::Bytes, extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::dtos::{
    requests::{CloneEventRequest, EventRequest},
    responses::{AttendeesResponse, DashboardResponse},
};
use crate::api::extractors::actor::AuthActor;
use crate::error::AppError;
use crate::state::AppState;

const DEFAULT_CLONE_SUFFIX: &str = "(copy)";

pub async fn dashboard(
    State(state): State<Arc<AppState>>,
    _actor: AuthActor,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(DashboardResponse {
        events: state.catalog.count().await?,
        upcoming_events: state.catalog.count_upcoming().await?,
        registrations: state.admission.total_count().await?,
    }))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    _actor: AuthActor,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.catalog.list_all().await?))
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AuthActor(actor): AuthActor,
    Json(payload): Json<EventRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating event: {}", payload.title);
    let event = state.catalog.create(payload.into_draft()?, &actor).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    _actor: AuthActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.catalog.get_by_id(&id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    Ok(Json(event))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    _actor: AuthActor,
    Path(id): Path<String>,
    Json(payload): Json<EventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.catalog.update(&id, payload.into_draft()?).await?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.catalog.delete(&id).await?;
    info!("Event {} deleted by {}", event.id, actor.id);

    for asset in state.catalog.orphaned_assets(&event).await? {
        if let Err(e) = state.assets.release(&asset).await {
            warn!("Failed to release asset {}: {}", asset, e);
        }
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn clone_event(
    State(state): State<Arc<AppState>>,
    AuthActor(actor): AuthActor,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: CloneEventRequest = if body.is_empty() {
        CloneEventRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| AppError::validation("title_suffix", e.to_string()))?
    };
    let suffix = payload.title_suffix.as_deref().unwrap_or(DEFAULT_CLONE_SUFFIX);

    let clone = state.catalog.clone_event(&id, &actor, suffix).await?;
    Ok((StatusCode::CREATED, Json(clone)))
}

pub async fn list_attendees(
    State(state): State<Arc<AppState>>,
    _actor: AuthActor,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.catalog.get_by_id(&id).await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    let registrations = state.admission.list_by_event(&event.id).await?;
    Ok(Json(AttendeesResponse {
        count: registrations.len() as i64,
        event_id: event.id,
        registrations,
    }))
}

pub async fn delete_attendee(
    State(state): State<Arc<AppState>>,
    AuthActor(actor): AuthActor,
    Path((id, registration_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    state.admission.delete_registration(&id, &registration_id).await?;
    info!("Attendee {} removed by {}", registration_id, actor.id);
    Ok(StatusCode::NO_CONTENT)
}
