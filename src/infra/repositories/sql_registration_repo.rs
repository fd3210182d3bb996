use crate::domain::{
    models::{event::Event, registration::Registration},
    ports::{AdmissionGate, RegistrationRepository},
};
use crate::error::{AppError, Rejection};
use crate::infra::db::Gateway;
use crate::params;
use async_trait::async_trait;

const REGISTRATION_COLUMNS: &str = "id, event_id, name, email, comment, cancel_token, registered_at";

pub struct SqlRegistrationRepo {
    gateway: Gateway,
}

impl SqlRegistrationRepo {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl RegistrationRepository for SqlRegistrationRepo {
    async fn create_admitted(
        &self,
        registration: &Registration,
        gate: AdmissionGate<'_>,
    ) -> Result<Event, AppError> {
        let mut tx = self.gateway.begin().await?;

        // A no-op write takes the event's row lock (PostgreSQL) or the database write
        // lock (SQLite) until commit, serializing admissions for the event.
        let locked = tx
            .execute("UPDATE events SET updated_at = updated_at WHERE id = ?", &params![&registration.event_id])
            .await?;
        if locked == 0 {
            return Err(Rejection::EventNotFound.into());
        }

        let event: Event = tx
            .query_one(event_select!("WHERE e.id = ?"), &params![&registration.event_id])
            .await?
            .ok_or(Rejection::EventNotFound)?;

        gate(&event, event.registration_count)?;

        tx.execute(
            "INSERT INTO registrations (id, event_id, name, email, comment, cancel_token, registered_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
            &params![
                &registration.id,
                &registration.event_id,
                &registration.name,
                &registration.email,
                &registration.comment,
                &registration.cancel_token,
                registration.registered_at,
            ],
        )
        .await?;

        tx.commit().await?;
        Ok(event)
    }

    async fn delete_by_cancel_token(&self, token: &str) -> Result<Option<Registration>, AppError> {
        let sql = format!("DELETE FROM registrations WHERE cancel_token = ? RETURNING {}", REGISTRATION_COLUMNS);
        Ok(self.gateway.query_one(&sql, &params![token]).await?)
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Registration>, AppError> {
        let sql = format!(
            "SELECT {} FROM registrations WHERE event_id = ? ORDER BY registered_at ASC, id ASC",
            REGISTRATION_COLUMNS
        );
        Ok(self.gateway.query(&sql, &params![event_id]).await?)
    }

    async fn delete(&self, event_id: &str, id: &str) -> Result<(), AppError> {
        let affected = self.gateway
            .execute("DELETE FROM registrations WHERE id = ? AND event_id = ?", &params![id, event_id])
            .await?;
        if affected == 0 {
            return Err(AppError::NotFound("Registration not found".into()));
        }
        Ok(())
    }

    async fn count_by_event(&self, event_id: &str) -> Result<i64, AppError> {
        Ok(self.gateway.count("SELECT COUNT(*) FROM registrations WHERE event_id = ?", &params![event_id]).await?)
    }

    async fn total_count(&self) -> Result<i64, AppError> {
        Ok(self.gateway.count("SELECT COUNT(*) FROM registrations", &[]).await?)
    }
}
