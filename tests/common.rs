use registration_backend::{
    api::{extractors::actor::ACTOR_HEADER, router::create_router},
    config::Config,
    domain::{
        models::{actor::Actor, event::{Event, EventDraft}},
        ports::EmailService,
    },
    error::AppError,
    infra::{
        db::{migrate, Gateway},
        factory::build_state,
        storage::local_asset_store::LocalAssetStore,
    },
    state::AppState,
};
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct SentMail {
    pub recipient: String,
    pub subject: String,
    pub body: String,
}

#[derive(Default)]
pub struct MockEmailService {
    pub sent: Mutex<Vec<SentMail>>,
}

#[async_trait]
impl EmailService for MockEmailService {
    async fn send(&self, recipient: &str, subject: &str, body: &str) -> Result<(), AppError> {
        self.sent.lock().unwrap().push(SentMail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub gateway: Gateway,
    pub db_filename: String,
    pub upload_dir: PathBuf,
    pub state: Arc<AppState>,
    pub mailer: Arc<MockEmailService>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let gateway = Gateway::connect(&db_url, 5)
            .await
            .expect("Failed to connect to test db");

        migrate::migrate(&gateway, migrate::bundled(gateway.dialect()))
            .await
            .expect("Failed to migrate test db");

        let upload_dir = std::env::temp_dir().join(format!("uploads_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&upload_dir).unwrap();

        let mut config = Config::for_database(db_url);
        config.upload_dir = upload_dir.clone();

        let mailer = Arc::new(MockEmailService::default());
        let state = Arc::new(
            build_state(
                &config,
                gateway.clone(),
                Some(mailer.clone() as Arc<dyn EmailService>),
                Arc::new(LocalAssetStore::new(upload_dir.clone())),
            )
            .expect("Failed to build state"),
        );

        let router = create_router(state.clone());

        Self {
            router,
            gateway,
            db_filename,
            upload_dir,
            state,
            mailer,
        }
    }

    pub fn organizer() -> Actor {
        Actor::new("organizer-1")
    }

    /// Creates an open event a week from now through the catalog.
    pub async fn seed_event(&self, title: &str, max_capacity: Option<i64>) -> Event {
        let mut draft = EventDraft::new(title, Utc::now() + Duration::days(7));
        draft.max_capacity = max_capacity;
        self.state.catalog.create(draft, &Self::organizer()).await.unwrap()
    }

    pub async fn request(&self, method: Method, uri: &str, actor: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header(ACTOR_HEADER, actor);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Polls the mock mailer until `count` mails arrived or two seconds passed.
    pub async fn wait_for_mail(&self, count: usize) -> Vec<SentMail> {
        for _ in 0..40 {
            {
                let sent = self.mailer.sent.lock().unwrap();
                if sent.len() >= count {
                    return sent.clone();
                }
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        self.mailer.sent.lock().unwrap().clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
        let _ = std::fs::remove_dir_all(&self.upload_dir);
    }
}
