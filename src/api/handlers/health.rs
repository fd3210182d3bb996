use axum::{extract::State, response::IntoResponse, Json};
use serde_json::json;
use std::sync::Arc;

use crate::error::AppError;
use crate::state::AppState;

pub async fn health_check(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    state.gateway.execute("SELECT 1", &[]).await?;
    Ok(Json(json!({ "status": "ok", "dialect": format!("{:?}", state.gateway.dialect()) })))
}
