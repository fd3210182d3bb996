use std::sync::Arc;
use crate::config::Config;
use crate::domain::ports::AssetStore;
use crate::domain::services::{
    admission::AdmissionEngine, event_catalog::EventCatalog, settings_service::SettingsService,
};
use crate::infra::db::Gateway;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: Gateway,
    pub catalog: Arc<EventCatalog>,
    pub admission: Arc<AdmissionEngine>,
    pub settings: Arc<SettingsService>,
    pub assets: Arc<dyn AssetStore>,
}
