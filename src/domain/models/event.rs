use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub description: String,
    /// Rendered from `description` at read time, never stored.
    #[sqlx(skip)]
    pub description_html: String,
    pub location: String,
    pub event_date: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_capacity: Option<i64>,
    pub attendee_list_public: bool,
    pub registration_open: bool,
    pub image_path: Option<String>,
    pub banner_path: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Derived from the registrations table by every read query.
    pub registration_count: i64,
}

/// Organizer-supplied fields of an event, validated but not yet persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub slug: Option<String>,
    pub description: String,
    pub location: String,
    pub event_date: DateTime<Utc>,
    pub registration_deadline: Option<DateTime<Utc>>,
    pub max_capacity: Option<i64>,
    pub attendee_list_public: bool,
    pub registration_open: bool,
    pub image_path: Option<String>,
    pub banner_path: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, event_date: DateTime<Utc>) -> Self {
        Self {
            title: title.into(),
            slug: None,
            description: String::new(),
            location: String::new(),
            event_date,
            registration_deadline: None,
            max_capacity: None,
            attendee_list_public: true,
            registration_open: true,
            image_path: None,
            banner_path: None,
            latitude: None,
            longitude: None,
        }
    }
}

impl Event {
    /// Seats still available, `None` when capacity is unbounded.
    pub fn remaining_capacity(&self) -> Option<i64> {
        self.max_capacity.map(|max| (max - self.registration_count).max(0))
    }
}
