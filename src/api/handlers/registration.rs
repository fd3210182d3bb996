use axum::{extract::{Path, State}, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

use crate::api::dtos::{
    requests::RegisterRequest,
    responses::{CancellationResponse, RegistrationCreatedResponse},
};
use crate::error::{AppError, Rejection};
use crate::state::AppState;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let event = state.catalog.get_by_slug(&slug).await?
        .ok_or(Rejection::EventNotFound)?;

    info!("Registration attempt for event: {}", slug);
    let registration = state.admission.register(&event.id, payload.into()).await?;
    let cancel_url = state.admission.cancel_url(&registration.cancel_token);

    Ok((StatusCode::CREATED, Json(RegistrationCreatedResponse { registration, cancel_url })))
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let registration = state.admission.cancel(&token).await?
        .ok_or(AppError::NotFound("Registration not found or already cancelled".into()))?;

    let event_slug = state.catalog.get_by_id(&registration.event_id).await?.map(|e| e.slug);

    Ok(Json(CancellationResponse { registration, event_slug }))
}
