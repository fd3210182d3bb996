use std::sync::Arc;

use tracing::{info, warn};

use crate::background::{confirmation_templates, start_mail_worker, MailDispatcher};
use crate::config::Config;
use crate::domain::ports::{AssetStore, EmailService};
use crate::domain::services::{
    admission::AdmissionEngine, event_catalog::EventCatalog, settings_service::SettingsService,
};
use crate::error::AppError;
use crate::infra::db::{migrate, Gateway};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::repositories::{
    sql_event_repo::SqlEventRepo, sql_registration_repo::SqlRegistrationRepo, sql_setting_repo::SqlSettingRepo,
};
use crate::infra::storage::local_asset_store::LocalAssetStore;
use crate::state::AppState;

/// Connects, migrates and wires the production state. Fails before anything is
/// served if the schema cannot be brought up to date.
pub async fn bootstrap_state(config: &Config) -> Result<AppState, AppError> {
    let gateway = Gateway::connect(&config.database_url, config.db_max_connections).await?;

    let report = migrate::migrate(&gateway, migrate::bundled(gateway.dialect())).await?;
    info!(
        "Schema up to date ({} applied, {} already present)",
        report.applied.len(),
        report.skipped.len()
    );

    let email_service: Option<Arc<dyn EmailService>> = match &config.mail_service_url {
        Some(url) => Some(Arc::new(HttpEmailService::new(
            url.clone(),
            config.mail_service_token.clone(),
            config.mail_from.clone(),
        ))),
        None => {
            warn!("MAIL_SERVICE_URL not set, confirmation mails are disabled");
            None
        }
    };

    let assets = Arc::new(LocalAssetStore::new(config.upload_dir.clone()));

    build_state(config, gateway, email_service, assets)
}

/// Wires services over an already migrated gateway. When an email service is given,
/// the confirmation mail worker is spawned on the current runtime.
pub fn build_state(
    config: &Config,
    gateway: Gateway,
    email_service: Option<Arc<dyn EmailService>>,
    assets: Arc<dyn AssetStore>,
) -> Result<AppState, AppError> {
    let mail = match email_service {
        Some(email_service) => {
            let templates = Arc::new(confirmation_templates()?);
            let (dispatcher, receiver) = MailDispatcher::channel();
            tokio::spawn(start_mail_worker(receiver, email_service, templates));
            dispatcher
        }
        None => MailDispatcher::disabled(),
    };

    let events = Arc::new(SqlEventRepo::new(gateway.clone()));
    let registrations = Arc::new(SqlRegistrationRepo::new(gateway.clone()));
    let settings = Arc::new(SqlSettingRepo::new(gateway.clone()));

    Ok(AppState {
        config: config.clone(),
        catalog: Arc::new(EventCatalog::new(events)),
        admission: Arc::new(AdmissionEngine::new(registrations, mail, config.base_url.clone())),
        settings: Arc::new(SettingsService::new(settings)),
        assets,
        gateway,
    })
}
