use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::app_settings_service::AppSettingsService;
use crate::content::GeminiContentService;
use crate::error::AppServicesError;
use crate::study_store::StudyStore;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<StudyStore>,
    app_settings: Arc<AppSettingsService>,
    content: Arc<GeminiContentService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization or loading fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::with_storage(&storage, clock).await
    }

    /// Build services over an existing storage bundle.
    ///
    /// The content client takes persisted AI settings first and falls back to
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if the store or the AI settings cannot be loaded.
    pub async fn with_storage(storage: &Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let store = Arc::new(StudyStore::from_storage(clock, storage).await?);
        let app_settings = Arc::new(AppSettingsService::new(Arc::clone(&storage.app_settings)));
        let settings = app_settings.load().await?;
        let content = Arc::new(GeminiContentService::from_settings(&settings));
        log::debug!("event=services_ready content_enabled={}", content.enabled());

        Ok(Self {
            store,
            app_settings,
            content,
        })
    }

    #[must_use]
    pub fn store(&self) -> Arc<StudyStore> {
        Arc::clone(&self.store)
    }

    #[must_use]
    pub fn app_settings(&self) -> Arc<AppSettingsService> {
        Arc::clone(&self.app_settings)
    }

    #[must_use]
    pub fn content(&self) -> Arc<GeminiContentService> {
        Arc::clone(&self.content)
    }
}
