pub mod admin_event;
pub mod event;
pub mod health;
pub mod registration;
pub mod settings;
