use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{admin_event, event, health, registration, settings};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Public
        .route("/api/v1/site", get(event::get_site))
        .route("/api/v1/events", get(event::list_upcoming))
        .route("/api/v1/events/{slug}", get(event::get_event))
        .route("/api/v1/events/{slug}/register", post(registration::register))
        .route("/api/v1/cancel/{token}", post(registration::cancel))

        // Organizer
        .route("/api/v1/admin/dashboard", get(admin_event::dashboard))
        .route("/api/v1/admin/events", get(admin_event::list_events).post(admin_event::create_event))
        .route(
            "/api/v1/admin/events/{id}",
            get(admin_event::get_event).put(admin_event::update_event).delete(admin_event::delete_event),
        )
        .route("/api/v1/admin/events/{id}/clone", post(admin_event::clone_event))
        .route("/api/v1/admin/events/{id}/attendees", get(admin_event::list_attendees))
        .route("/api/v1/admin/events/{id}/attendees/{registration_id}", delete(admin_event::delete_attendee))
        .route("/api/v1/admin/settings", get(settings::get_settings).put(settings::update_settings))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        actor_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
