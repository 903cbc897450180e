#![forbid(unsafe_code)]

pub mod app_services;
pub mod app_settings_service;
pub mod content;
pub mod error;
pub mod study_store;

pub use study_core::Clock;

pub use app_services::AppServices;
pub use app_settings_service::AppSettingsService;
pub use content::{ContentConfig, ContentGenerator, DEFAULT_PRACTICE_COUNT, GeminiContentService};
pub use error::{AppServicesError, AppSettingsServiceError, ContentError, StudyStoreError};
pub use study_store::StudyStore;
