use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::background::{ConfirmationMail, MailDispatcher};
use crate::domain::models::{
    event::Event,
    registration::{NewRegistrationParams, Registration},
};
use crate::domain::ports::RegistrationRepository;
use crate::error::{AppError, Rejection};

/// Attendee-supplied registration fields, before normalization.
#[derive(Debug, Clone, Default)]
pub struct RegistrationRequest {
    pub name: String,
    pub email: Option<String>,
    pub comment: Option<String>,
}

/// Checks, in order, that registration is open, that the deadline has not passed and
/// that a seat is left.
pub fn evaluate(event: &Event, current_count: i64, now: DateTime<Utc>) -> Result<(), Rejection> {
    if !event.registration_open {
        return Err(Rejection::RegistrationNotOpen);
    }
    if let Some(deadline) = event.registration_deadline
        && now > deadline {
        return Err(Rejection::RegistrationDeadlinePassed);
    }
    if let Some(max) = event.max_capacity
        && current_count >= max {
        return Err(Rejection::RegistrationFull);
    }
    Ok(())
}

pub struct AdmissionEngine {
    registrations: Arc<dyn RegistrationRepository>,
    mail: MailDispatcher,
    base_url: String,
}

impl AdmissionEngine {
    pub fn new(registrations: Arc<dyn RegistrationRepository>, mail: MailDispatcher, base_url: impl Into<String>) -> Self {
        Self {
            registrations,
            mail,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Admits an attendee if the event's gates pass against its locked state.
    ///
    /// On success a confirmation carrying the cancel link is queued when the attendee
    /// gave an email address and mail delivery is configured.
    pub async fn register(&self, event_id: &str, request: RegistrationRequest) -> Result<Registration, AppError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(AppError::validation("name", "Name is required"));
        }

        let registration = Registration::new(
            NewRegistrationParams {
                event_id: event_id.to_string(),
                name: name.to_string(),
                email: non_blank(request.email),
                comment: non_blank(request.comment),
            },
            Utc::now(),
        );

        let gate = |event: &Event, count: i64| evaluate(event, count, Utc::now());
        let event = match self.registrations.create_admitted(&registration, &gate).await {
            Ok(event) => event,
            Err(AppError::Rejected(rejection)) => {
                info!("Registration for event {} rejected: {}", event_id, rejection.code());
                return Err(rejection.into());
            }
            Err(e) => return Err(e),
        };

        info!("Registration {} admitted to event {}", registration.id, event.id);

        if let Some(email) = &registration.email {
            if self.mail.is_enabled() {
                self.mail.dispatch(ConfirmationMail {
                    recipient: email.clone(),
                    event_title: event.title.clone(),
                    cancel_url: self.cancel_url(&registration.cancel_token),
                });
            } else {
                warn!("Mail delivery is not configured, skipping confirmation for {}", registration.id);
            }
        }

        Ok(registration)
    }

    /// Withdraws the registration holding `token`. A token works once; later calls
    /// return `None`.
    pub async fn cancel(&self, token: &str) -> Result<Option<Registration>, AppError> {
        let cancelled = self.registrations.delete_by_cancel_token(token).await?;
        if let Some(registration) = &cancelled {
            info!("Registration {} cancelled", registration.id);
        }
        Ok(cancelled)
    }

    pub async fn list_by_event(&self, event_id: &str) -> Result<Vec<Registration>, AppError> {
        self.registrations.list_by_event(event_id).await
    }

    pub async fn delete_registration(&self, event_id: &str, registration_id: &str) -> Result<(), AppError> {
        self.registrations.delete(event_id, registration_id).await?;
        info!("Registration {} removed from event {}", registration_id, event_id);
        Ok(())
    }

    pub async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError> {
        self.registrations.count_by_event(event_id).await
    }

    pub async fn total_count(&self) -> Result<i64, AppError> {
        self.registrations.total_count().await
    }

    pub fn cancel_url(&self, token: &str) -> String {
        format!("{}/cancel/{}", self.base_url, token)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
