use std::env;
use std::path::PathBuf;

use crate::error::AppError;
use crate::infra::db::Dialect;

const DEFAULT_DATABASE_URL: &str = "sqlite://registration.db?mode=rwc";
const DEFAULT_BASE_URL: &str = "http://localhost:8080";

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Public origin used to build cancellation links.
    pub base_url: String,
    /// `None` disables outbound mail.
    pub mail_service_url: Option<String>,
    pub mail_service_token: String,
    pub mail_from: String,
    pub upload_dir: PathBuf,
    pub db_max_connections: u32,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

        let port = match env::var("PORT") {
            Ok(raw) => raw.trim().parse().map_err(|_| AppError::validation("PORT", "PORT must be a number"))?,
            Err(_) => 8080,
        };

        let db_max_connections = match env::var("DB_MAX_CONNECTIONS") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| AppError::validation("DB_MAX_CONNECTIONS", "DB_MAX_CONNECTIONS must be a number"))?,
            Err(_) => default_max_connections(&database_url),
        };

        Ok(Self {
            port,
            base_url: env::var("BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            mail_service_url: env::var("MAIL_SERVICE_URL").ok().filter(|url| !url.trim().is_empty()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_default(),
            mail_from: env::var("MAIL_FROM").unwrap_or_else(|_| "noreply@localhost".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()).into(),
            db_max_connections,
            database_url,
        })
    }

    /// Defaults for everything but the database, with mail disabled.
    pub fn for_database(database_url: impl Into<String>) -> Self {
        let database_url = database_url.into();
        Self {
            port: 8080,
            base_url: DEFAULT_BASE_URL.to_string(),
            mail_service_url: None,
            mail_service_token: String::new(),
            mail_from: "noreply@localhost".to_string(),
            upload_dir: PathBuf::from("uploads"),
            db_max_connections: default_max_connections(&database_url),
            database_url,
        }
    }
}

fn default_max_connections(database_url: &str) -> u32 {
    match Dialect::from_url(database_url) {
        Dialect::ClientServer => 10,
        Dialect::Embedded => 5,
    }
}
