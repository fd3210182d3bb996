use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use rand::{distributions::Alphanumeric, Rng};

const CANCEL_TOKEN_LEN: usize = 48;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Registration {
    pub id: String,
    pub event_id: String,
    pub name: String,
    pub email: Option<String>,
    pub comment: Option<String>,
    #[serde(skip_serializing)]
    pub cancel_token: String,
    pub registered_at: DateTime<Utc>,
}

pub struct NewRegistrationParams {
    pub event_id: String,
    pub name: String,
    pub email: Option<String>,
    pub comment: Option<String>,
}

impl Registration {
    pub fn new(params: NewRegistrationParams, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: params.event_id,
            name: params.name,
            email: params.email,
            comment: params.comment,
            cancel_token: generate_cancel_token(),
            registered_at: now,
        }
    }
}

pub fn generate_cancel_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CANCEL_TOKEN_LEN)
        .map(char::from)
        .collect()
}
