use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::info;

use crate::domain::models::setting::{Setting, SiteSettings};
use crate::domain::ports::SettingRepository;
use crate::error::AppError;

pub const SITE_NAME: &str = "site_name";
pub const ACCENT_COLOR: &str = "accent_color";

pub struct SettingsService {
    settings: Arc<dyn SettingRepository>,
}

impl SettingsService {
    pub fn new(settings: Arc<dyn SettingRepository>) -> Self {
        Self { settings }
    }

    /// Site presentation values, with defaults standing in for missing or blank keys.
    pub async fn site_settings(&self) -> Result<SiteSettings, AppError> {
        let defaults = SiteSettings::default();
        let stored: BTreeMap<String, String> = self
            .settings
            .all()
            .await?
            .into_iter()
            .filter(|s| !s.value.trim().is_empty())
            .map(|s| (s.key, s.value))
            .collect();

        Ok(SiteSettings {
            site_name: stored.get(SITE_NAME).cloned().unwrap_or(defaults.site_name),
            accent_color: stored.get(ACCENT_COLOR).cloned().unwrap_or(defaults.accent_color),
        })
    }

    pub async fn all(&self) -> Result<Vec<Setting>, AppError> {
        self.settings.all().await
    }

    /// Upserts every pair atomically. Keys are trimmed and must not be blank.
    pub async fn update(&self, values: &BTreeMap<String, String>) -> Result<(), AppError> {
        if values.keys().any(|k| k.trim().is_empty()) {
            return Err(AppError::validation("key", "Setting keys must not be blank"));
        }
        if let Some(color) = values.get(ACCENT_COLOR)
            && !is_hex_color(color.trim()) {
            return Err(AppError::validation("accent_color", "Accent color must be a #rrggbb value"));
        }

        let pairs: Vec<(&str, &str)> = values.iter().map(|(k, v)| (k.trim(), v.trim())).collect();
        self.settings.set_many(&pairs).await?;
        info!("Updated {} setting(s)", values.len());
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}
