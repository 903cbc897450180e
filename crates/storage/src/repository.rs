use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use study_core::model::{AppSettings, Catalogue, UserSettings};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Repository contract for the syllabus and its completion state.
///
/// The catalogue is stored and replaced as a whole; it is small and every
/// change is followed by a save.
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// Load the persisted catalogue, or `None` if nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the stored data cannot be read or decoded.
    async fn load_catalogue(&self) -> Result<Option<Catalogue>, StorageError>;

    /// Replace the persisted catalogue.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the catalogue cannot be stored.
    async fn save_catalogue(&self, catalogue: &Catalogue) -> Result<(), StorageError>;

    /// Remove the persisted catalogue so the next load returns `None`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on storage failures.
    async fn clear_catalogue(&self) -> Result<(), StorageError>;
}

/// Repository contract for the study-plan date range.
#[async_trait]
pub trait UserSettingsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the stored settings cannot be read or decoded.
    async fn get_user_settings(&self) -> Result<Option<UserSettings>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_user_settings(&self, settings: &UserSettings) -> Result<(), StorageError>;
}

/// Repository contract for AI provider settings.
#[async_trait]
pub trait AppSettingsRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the stored settings cannot be read or fail validation.
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` if the settings cannot be stored.
    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    catalogue: Arc<Mutex<Option<Catalogue>>>,
    user_settings: Arc<Mutex<Option<UserSettings>>>,
    app_settings: Arc<Mutex<Option<AppSettings>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock<T>(slot: &Mutex<T>) -> Result<MutexGuard<'_, T>, StorageError> {
    slot.lock()
        .map_err(|e| StorageError::Connection(e.to_string()))
}

#[async_trait]
impl CatalogueRepository for InMemoryRepository {
    async fn load_catalogue(&self) -> Result<Option<Catalogue>, StorageError> {
        Ok(lock(&self.catalogue)?.clone())
    }

    async fn save_catalogue(&self, catalogue: &Catalogue) -> Result<(), StorageError> {
        *lock(&self.catalogue)? = Some(catalogue.clone());
        Ok(())
    }

    async fn clear_catalogue(&self) -> Result<(), StorageError> {
        *lock(&self.catalogue)? = None;
        Ok(())
    }
}

#[async_trait]
impl UserSettingsRepository for InMemoryRepository {
    async fn get_user_settings(&self) -> Result<Option<UserSettings>, StorageError> {
        Ok(*lock(&self.user_settings)?)
    }

    async fn save_user_settings(&self, settings: &UserSettings) -> Result<(), StorageError> {
        *lock(&self.user_settings)? = Some(*settings);
        Ok(())
    }
}

#[async_trait]
impl AppSettingsRepository for InMemoryRepository {
    async fn get_settings(&self) -> Result<Option<AppSettings>, StorageError> {
        Ok(lock(&self.app_settings)?.clone())
    }

    async fn save_settings(&self, settings: &AppSettings) -> Result<(), StorageError> {
        *lock(&self.app_settings)? = Some(settings.clone());
        Ok(())
    }
}

/// Aggregates repositories behind trait objects.
#[derive(Clone)]
pub struct Storage {
    pub catalogue: Arc<dyn CatalogueRepository>,
    pub user_settings: Arc<dyn UserSettingsRepository>,
    pub app_settings: Arc<dyn AppSettingsRepository>,
}

impl Storage {
    /// Build a `Storage` backed by a fresh in-memory repository.
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        Self {
            catalogue: Arc::new(repo.clone()),
            user_settings: Arc::new(repo.clone()),
            app_settings: Arc::new(repo),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::ItemId;
    use study_core::syllabus::default_catalogue;
    use study_core::time::fixed_today;

    #[tokio::test]
    async fn in_memory_catalogue_roundtrip_and_clear() {
        let repo = InMemoryRepository::new();
        assert!(repo.load_catalogue().await.unwrap().is_none());

        let catalogue = default_catalogue().toggle(&ItemId::new("ps-1"));
        repo.save_catalogue(&catalogue).await.unwrap();
        assert_eq!(repo.load_catalogue().await.unwrap(), Some(catalogue));

        repo.clear_catalogue().await.unwrap();
        assert!(repo.load_catalogue().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn in_memory_settings_roundtrip() {
        let repo = InMemoryRepository::new();
        let settings = UserSettings::starting(fixed_today());
        repo.save_user_settings(&settings).await.unwrap();
        assert_eq!(repo.get_user_settings().await.unwrap(), Some(settings));
        assert!(repo.get_settings().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn storage_in_memory_shares_one_backing_store() {
        let storage = Storage::in_memory();
        storage
            .catalogue
            .save_catalogue(&default_catalogue())
            .await
            .unwrap();
        let loaded = storage.catalogue.load_catalogue().await.unwrap();
        assert_eq!(loaded.map(|c| c.len()), Some(29));
    }
}
