use serde::Serialize;

use crate::domain::models::{
    event::Event,
    registration::Registration,
    setting::{Setting, SiteSettings},
};

/// Public event page. `attendees` is present only when the event publishes its list.
#[derive(Serialize)]
pub struct PublicEventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub remaining_capacity: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attendees: Option<Vec<String>>,
}

#[derive(Serialize)]
pub struct RegistrationCreatedResponse {
    #[serde(flatten)]
    pub registration: Registration,
    pub cancel_url: String,
}

#[derive(Serialize)]
pub struct CancellationResponse {
    pub registration: Registration,
    pub event_slug: Option<String>,
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub events: i64,
    pub upcoming_events: i64,
    pub registrations: i64,
}

#[derive(Serialize)]
pub struct AttendeesResponse {
    pub event_id: String,
    pub count: i64,
    pub registrations: Vec<Registration>,
}

#[derive(Serialize)]
pub struct SettingsResponse {
    pub site: SiteSettings,
    pub settings: Vec<Setting>,
}
