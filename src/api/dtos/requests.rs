use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::models::event::EventDraft;
use crate::domain::services::admission::RegistrationRequest;
use crate::error::AppError;

/// Organizer event form. Dates arrive as RFC 3339 strings so a bad value can be
/// reported against its field.
#[derive(Deserialize)]
pub struct EventRequest {
    #[serde(default)]
    pub title: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub event_date: String,
    pub registration_deadline: Option<String>,
    pub max_capacity: Option<i64>,
    pub attendee_list_public: Option<bool>,
    pub registration_open: Option<bool>,
    pub image_path: Option<String>,
    pub banner_path: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl EventRequest {
    pub fn into_draft(self) -> Result<EventDraft, AppError> {
        if self.event_date.trim().is_empty() {
            return Err(AppError::validation("event_date", "Event date is required"));
        }
        let event_date = parse_timestamp("event_date", &self.event_date)?;

        let registration_deadline = match blank_to_none(self.registration_deadline) {
            Some(raw) => Some(parse_timestamp("registration_deadline", &raw)?),
            None => None,
        };

        Ok(EventDraft {
            title: self.title,
            slug: blank_to_none(self.slug),
            description: self.description,
            location: self.location,
            event_date,
            registration_deadline,
            max_capacity: self.max_capacity,
            attendee_list_public: self.attendee_list_public.unwrap_or(true),
            registration_open: self.registration_open.unwrap_or(true),
            image_path: blank_to_none(self.image_path),
            banner_path: blank_to_none(self.banner_path),
            latitude: self.latitude,
            longitude: self.longitude,
        })
    }
}

#[derive(Deserialize, Default)]
pub struct CloneEventRequest {
    pub title_suffix: Option<String>,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub comment: Option<String>,
}

impl From<RegisterRequest> for RegistrationRequest {
    fn from(req: RegisterRequest) -> Self {
        RegistrationRequest {
            name: req.name,
            email: req.email,
            comment: req.comment,
        }
    }
}

fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::validation(field, "Expected an RFC 3339 timestamp"))
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
