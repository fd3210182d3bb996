use crate::domain::{models::event::Event, ports::EventRepository};
use crate::error::AppError;
use crate::infra::db::Gateway;
use crate::params;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub struct SqlEventRepo {
    gateway: Gateway,
}

impl SqlEventRepo {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }
}

#[async_trait]
impl EventRepository for SqlEventRepo {
    async fn create(&self, event: &Event) -> Result<(), AppError> {
        self.gateway.execute(
            r#"INSERT INTO events (
                id, title, slug, description, location, event_date, registration_deadline, max_capacity,
                attendee_list_public, registration_open, image_path, banner_path, latitude, longitude,
                created_by, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            &params![
                &event.id,
                &event.title,
                &event.slug,
                &event.description,
                &event.location,
                event.event_date,
                event.registration_deadline,
                event.max_capacity,
                event.attendee_list_public,
                event.registration_open,
                &event.image_path,
                &event.banner_path,
                event.latitude,
                event.longitude,
                &event.created_by,
                event.created_at,
                event.updated_at,
            ],
        )
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        Ok(self.gateway.query_one(event_select!("WHERE e.id = ?"), &params![id]).await?)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        Ok(self.gateway.query_one(event_select!("WHERE e.slug = ?"), &params![slug]).await?)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let count = self.gateway.count("SELECT COUNT(*) FROM events WHERE slug = ?", &params![slug]).await?;
        Ok(count > 0)
    }

    async fn list_upcoming(&self, now: DateTime<Utc>) -> Result<Vec<Event>, AppError> {
        Ok(self.gateway.query(
            event_select!("WHERE e.event_date >= ? AND e.registration_open = ? ORDER BY e.event_date ASC"),
            &params![now, true],
        )
        .await?)
    }

    async fn list_all(&self) -> Result<Vec<Event>, AppError> {
        Ok(self.gateway.query(event_select!("ORDER BY e.event_date DESC"), &[]).await?)
    }

    async fn update(&self, event: &Event) -> Result<Event, AppError> {
        let affected = self.gateway.execute(
            r#"UPDATE events SET
                title = ?, slug = ?, description = ?, location = ?, event_date = ?,
                registration_deadline = ?, max_capacity = ?,
                attendee_list_public = ?, registration_open = ?,
                image_path = ?, banner_path = ?, latitude = ?, longitude = ?,
                updated_at = ?
               WHERE id = ?"#,
            &params![
                &event.title,
                &event.slug,
                &event.description,
                &event.location,
                event.event_date,
                event.registration_deadline,
                event.max_capacity,
                event.attendee_list_public,
                event.registration_open,
                &event.image_path,
                &event.banner_path,
                event.latitude,
                event.longitude,
                event.updated_at,
                &event.id,
            ],
        )
        .await?;

        if affected == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }

        self.find_by_id(&event.id).await?
            .ok_or(AppError::NotFound("Event not found".into()))
    }

    async fn delete(&self, id: &str) -> Result<Event, AppError> {
        let event = self.find_by_id(id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let affected = self.gateway.execute("DELETE FROM events WHERE id = ?", &params![id]).await?;
        if affected == 0 {
            return Err(AppError::NotFound("Event not found".into()));
        }
        Ok(event)
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.gateway.count("SELECT COUNT(*) FROM events", &[]).await?)
    }

    async fn count_upcoming(&self, now: DateTime<Utc>) -> Result<i64, AppError> {
        Ok(self.gateway.count("SELECT COUNT(*) FROM events WHERE event_date >= ?", &params![now]).await?)
    }

    async fn count_asset_references(&self, filename: &str) -> Result<i64, AppError> {
        Ok(self.gateway
            .count(
                "SELECT COUNT(*) FROM events WHERE image_path = ? OR banner_path = ?",
                &params![filename, filename],
            )
            .await?)
    }
}
