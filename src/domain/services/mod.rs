pub mod admission;
pub mod event_catalog;
pub mod settings_service;
pub mod slug;
