use crate::domain::models::{event::Event, registration::Registration, setting::Setting};
use crate::error::{AppError, Rejection};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Admission gate evaluated against the locked event and its current attendee count.
pub type AdmissionGate<'a> = &'a (dyn Fn(&Event, i64) -> Result<(), Rejection> + Send + Sync);

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create(&self, event: &Event) -> Result<(), AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError>;
    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError>;
    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError>;
    async fn list_all(&self) -> Result<Vec<Event>, AppError>;
    async fn update(&self, event: &Event) -> Result<Event, AppError>;
    async fn delete(&self, id: &str) -> Result<Event, AppError>;
    async fn count(&self) -> Result<i64, AppError>;
    async fn count_upcoming(&self, now: DateTime<Utc>) -> Result<i64, AppError>;
    /// Number of events whose image or banner is `filename`.
    async fn count_asset_references(&self, filename: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Locks the event, evaluates `gate` against fresh state and inserts `registration`
    /// only if the gate passes, all in one transaction.
    async fn create_admitted(
        &self,
        registration: &Registration,
        gate: AdmissionGate<'_>,
    ) -> Result<Event, AppError>;
    /// Removes and returns the registration holding `token`, if any.
    async fn delete_by_cancel_token(&self, token: &str) -> Result<Option<Registration>, AppError>;
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Registration>, AppError>;
    async fn delete(&self, event_id: &str, id: &str) -> Result<(), AppError>;
    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError>;
    async fn total_count(&self) -> Result<i64, AppError>;
}

#[async_trait]
pub trait SettingRepository: Send + Sync {
    /// Upserts every pair in one transaction.
    async fn set_many(&self, values: &[(&str, &str)]) -> Result<(), AppError>;
    async fn all(&self) -> Result<Vec<Setting>, AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), AppError>;
}

/// Storage for uploaded images, addressed by opaque filename.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn release(&self, filename: &str) -> Result<(), AppError>;
}
