use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq, Eq)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// Read-only snapshot of site-wide presentation settings.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SiteSettings {
    pub site_name: String,
    pub accent_color: String,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            site_name: "LibreRegistration".to_string(),
            accent_color: "#6d28d9".to_string(),
        }
    }
}
