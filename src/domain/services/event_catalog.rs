use std::sync::Arc;

use chrono::Utc;
use pulldown_cmark::{html, Event as MdEvent, Options, Parser};
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::models::{
    actor::Actor,
    event::{Event, EventDraft},
};
use crate::domain::ports::EventRepository;
use crate::domain::services::slug;
use crate::error::AppError;

pub struct EventCatalog {
    events: Arc<dyn EventRepository>,
}

impl EventCatalog {
    pub fn new(events: Arc<dyn EventRepository>) -> Self {
        Self { events }
    }

    /// Persists a new event under the smallest free slug derived from the draft.
    pub async fn create(&self, draft: EventDraft, actor: &Actor) -> Result<Event, AppError> {
        validate_draft(&draft)?;

        let base = draft
            .slug
            .as_deref()
            .map(slug::generate)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slug::generate(&draft.title));
        if base.is_empty() {
            return Err(AppError::validation("title", "Title must contain at least one letter or digit"));
        }

        let now = Utc::now();
        let mut event = Event {
            id: Uuid::new_v4().to_string(),
            title: draft.title.trim().to_string(),
            slug: String::new(),
            description: draft.description,
            description_html: String::new(),
            location: draft.location,
            event_date: draft.event_date,
            registration_deadline: draft.registration_deadline,
            max_capacity: draft.max_capacity,
            attendee_list_public: draft.attendee_list_public,
            registration_open: draft.registration_open,
            image_path: draft.image_path,
            banner_path: draft.banner_path,
            latitude: draft.latitude,
            longitude: draft.longitude,
            created_by: actor.id.clone(),
            created_at: now,
            updated_at: now,
            registration_count: 0,
        };

        // The unique index on slug catches a concurrent creator that took the same
        // candidate between the lookup and the insert. Each conflict means another row
        // was committed, so the next lookup moves past it.
        loop {
            event.slug = self.resolve_slug(&base).await?;
            match self.events.create(&event).await {
                Ok(()) => break,
                Err(e) if e.is_unique_violation() => {
                    warn!("Slug {} was taken concurrently, retrying", event.slug);
                }
                Err(e) => return Err(e),
            }
        }

        info!("Event created: {} ({}) by {}", event.id, event.slug, actor.id);
        event.description_html = render_description(&event.description);
        Ok(event)
    }

    pub async fn update(&self, id: &str, draft: EventDraft) -> Result<Event, AppError> {
        validate_draft(&draft)?;

        let existing = self.events.find_by_id(id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let slug = match draft.slug.as_deref() {
            Some(requested) => {
                let normalized = slug::generate(requested);
                if normalized.is_empty() {
                    return Err(AppError::validation("slug", "Slug must contain at least one letter or digit"));
                }
                normalized
            }
            None => existing.slug.clone(),
        };

        let event = Event {
            title: draft.title.trim().to_string(),
            slug,
            description: draft.description,
            location: draft.location,
            event_date: draft.event_date,
            registration_deadline: draft.registration_deadline,
            max_capacity: draft.max_capacity,
            attendee_list_public: draft.attendee_list_public,
            registration_open: draft.registration_open,
            image_path: draft.image_path,
            banner_path: draft.banner_path,
            latitude: draft.latitude,
            longitude: draft.longitude,
            updated_at: Utc::now(),
            ..existing
        };

        let mut updated = self.events.update(&event).await?;
        info!("Event updated: {}", updated.id);
        updated.description_html = render_description(&updated.description);
        Ok(updated)
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        Ok(self.events.find_by_id(id).await?.map(with_rendered_description))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        Ok(self.events.find_by_slug(slug).await?.map(with_rendered_description))
    }

    /// Open events that have not happened yet, soonest first.
    pub async fn list_upcoming(&self) -> Result<Vec<Event>, AppError> {
        let events = self.events.list_upcoming(Utc::now()).await?;
        Ok(events.into_iter().map(with_rendered_description).collect())
    }

    /// Every event, latest date first.
    pub async fn list_all(&self) -> Result<Vec<Event>, AppError> {
        let events = self.events.list_all().await?;
        Ok(events.into_iter().map(with_rendered_description).collect())
    }

    /// Removes the event and returns it. Releasing its uploaded media is up to the caller.
    pub async fn delete(&self, id: &str) -> Result<Event, AppError> {
        let event = self.events.delete(id).await?;
        info!("Event deleted: {} ({})", event.id, event.slug);
        Ok(event)
    }

    /// Copies `source_id` under a new identity. The copy always starts with registration closed.
    pub async fn clone_event(&self, source_id: &str, actor: &Actor, title_suffix: &str) -> Result<Event, AppError> {
        let source = self.events.find_by_id(source_id).await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let suffix = title_suffix.trim();
        let title = if suffix.is_empty() {
            source.title.clone()
        } else {
            format!("{} {}", source.title, suffix)
        };

        let draft = EventDraft {
            title,
            slug: None,
            description: source.description,
            location: source.location,
            event_date: source.event_date,
            registration_deadline: source.registration_deadline,
            max_capacity: source.max_capacity,
            attendee_list_public: source.attendee_list_public,
            registration_open: false,
            image_path: source.image_path,
            banner_path: source.banner_path,
            latitude: source.latitude,
            longitude: source.longitude,
        };

        let clone = self.create(draft, actor).await?;
        info!("Event {} cloned into {}", source_id, clone.id);
        Ok(clone)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        self.events.count().await
    }

    pub async fn count_upcoming(&self) -> Result<i64, AppError> {
        self.events.count_upcoming(Utc::now()).await
    }

    /// Subset of `event`'s media no remaining event refers to.
    pub async fn orphaned_assets(&self, event: &Event) -> Result<Vec<String>, AppError> {
        let mut orphaned = Vec::new();
        for asset in [&event.image_path, &event.banner_path].into_iter().flatten() {
            if !orphaned.contains(asset) && self.events.count_asset_references(asset).await? == 0 {
                orphaned.push(asset.clone());
            }
        }
        Ok(orphaned)
    }

    /// `base`, or `base-N` with the smallest N >= 2 not yet taken.
    async fn resolve_slug(&self, base: &str) -> Result<String, AppError> {
        let mut suffix = 1u64;
        loop {
            let candidate = if suffix == 1 { base.to_string() } else { format!("{}-{}", base, suffix) };
            if !self.events.slug_exists(&candidate).await? {
                return Ok(candidate);
            }
            suffix += 1;
        }
    }
}

fn validate_draft(draft: &EventDraft) -> Result<(), AppError> {
    if draft.title.trim().is_empty() {
        return Err(AppError::validation("title", "Title is required"));
    }
    if let Some(max) = draft.max_capacity
        && max < 1 {
        return Err(AppError::validation("max_capacity", "Capacity must be at least 1"));
    }
    if let Some(lat) = draft.latitude
        && !(-90.0..=90.0).contains(&lat) {
        return Err(AppError::validation("latitude", "Latitude must be between -90 and 90"));
    }
    if let Some(lng) = draft.longitude
        && !(-180.0..=180.0).contains(&lng) {
        return Err(AppError::validation("longitude", "Longitude must be between -180 and 180"));
    }
    Ok(())
}

fn with_rendered_description(mut event: Event) -> Event {
    event.description_html = render_description(&event.description);
    event
}

/// Renders CommonMark to HTML with raw HTML escaped. Falls back to the source text
/// when rendering produces nothing for non-blank input.
pub fn render_description(source: &str) -> String {
    if source.trim().is_empty() {
        return String::new();
    }

    let parser = Parser::new_ext(source, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES).map(|event| match event {
        MdEvent::Html(raw) | MdEvent::InlineHtml(raw) => MdEvent::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);

    if out.trim().is_empty() {
        return source.to_string();
    }
    out
}
