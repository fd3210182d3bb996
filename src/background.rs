use std::sync::Arc;

use tera::{Context, Tera};
use tokio::sync::mpsc;
use tracing::{error, info, info_span, warn, Instrument};

use crate::domain::ports::EmailService;
use crate::error::AppError;

pub const CONFIRMATION_BODY: &str = "confirmation.txt";
pub const CONFIRMATION_SUBJECT: &str = "confirmation_subject.txt";

/// Everything the worker needs to tell an attendee how to cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationMail {
    pub recipient: String,
    pub event_title: String,
    pub cancel_url: String,
}

/// Fire-and-forget handle onto the confirmation mail worker. A disabled dispatcher
/// drops every mail.
#[derive(Clone, Default)]
pub struct MailDispatcher {
    sender: Option<mpsc::UnboundedSender<ConfirmationMail>>,
}

impl MailDispatcher {
    pub fn disabled() -> Self {
        Self { sender: None }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ConfirmationMail>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender: Some(sender) }, receiver)
    }

    pub fn is_enabled(&self) -> bool {
        self.sender.is_some()
    }

    pub fn dispatch(&self, mail: ConfirmationMail) {
        let Some(sender) = &self.sender else {
            return;
        };
        if sender.send(mail).is_err() {
            warn!("Mail worker is gone, dropping confirmation");
        }
    }
}

/// Loads the built-in confirmation templates.
pub fn confirmation_templates() -> Result<Tera, AppError> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        (CONFIRMATION_BODY, include_str!("../templates/confirmation.txt")),
        (CONFIRMATION_SUBJECT, include_str!("../templates/confirmation_subject.txt")),
    ])
    .map_err(|e| AppError::InternalWithMsg(format!("Tera parse error: {:?}", e)))?;
    Ok(tera)
}

pub async fn start_mail_worker(
    mut receiver: mpsc::UnboundedReceiver<ConfirmationMail>,
    email_service: Arc<dyn EmailService>,
    templates: Arc<Tera>,
) {
    info!("Starting confirmation mail worker...");

    while let Some(mail) = receiver.recv().await {
        let span = info_span!("confirmation_mail", recipient = %mail.recipient);

        async {
            match deliver(email_service.as_ref(), &templates, &mail).await {
                Ok(()) => info!("Confirmation sent"),
                Err(e) => error!("Confirmation failed: {}", e),
            }
        }
        .instrument(span)
        .await;
    }

    info!("Mail worker stopped");
}

async fn deliver(email_service: &dyn EmailService, templates: &Tera, mail: &ConfirmationMail) -> Result<(), AppError> {
    let (subject, body) = render_confirmation(templates, mail)?;
    email_service.send(&mail.recipient, &subject, &body).await
}

pub fn render_confirmation(templates: &Tera, mail: &ConfirmationMail) -> Result<(String, String), AppError> {
    let mut context = Context::new();
    context.insert("event_title", &mail.event_title);
    context.insert("cancel_url", &mail.cancel_url);

    let subject = templates
        .render(CONFIRMATION_SUBJECT, &context)
        .map_err(|e| AppError::InternalWithMsg(format!("Tera subject render error: {:?}", e)))?;
    let body = templates
        .render(CONFIRMATION_BODY, &context)
        .map_err(|e| AppError::InternalWithMsg(format!("Tera render error: {:?}", e)))?;

    Ok((subject.trim().to_string(), body))
}
