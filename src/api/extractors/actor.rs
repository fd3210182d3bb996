use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::Span;

use crate::domain::models::actor::Actor;
use crate::error::AppError;

/// Header carrying the organizer id, set by the session layer in front of this service.
pub const ACTOR_HEADER: &str = "x-actor-id";

pub struct AuthActor(pub Actor);

impl<S> FromRequestParts<S> for AuthActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = parts.headers.get(ACTOR_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AppError::Unauthorized)?;

        Span::current().record("actor_id", actor_id);

        Ok(AuthActor(Actor::new(actor_id)))
    }
}
