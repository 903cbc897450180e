//! Shared error types for the services crate.

use thiserror::Error;

use storage::repository::StorageError;
use storage::snapshot::SnapshotError;
use storage::sqlite::SqliteInitError;
use study_core::model::{AppSettingsError, ItemId};
use study_core::time::DateParseError;

/// Errors emitted by content generators and content workflows.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ContentError {
    #[error("content generation is not configured")]
    Disabled,
    #[error("content request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("content generator returned an empty response")]
    EmptyResponse,
    #[error("content generator returned malformed JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("content generation for `{0}` is already in progress")]
    AlreadyInFlight(ItemId),
    #[error("unknown study item `{0}`")]
    UnknownItem(ItemId),
    #[error("study item `{0}` has no generated content yet")]
    MissingContent(ItemId),
}

/// Errors emitted by `StudyStore`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StudyStoreError {
    #[error("revision vault is locked: {remaining} item(s) left")]
    VaultLocked { remaining: usize },
    #[error(transparent)]
    DateParse(#[from] DateParseError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `AppSettingsService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSettingsServiceError {
    #[error(transparent)]
    Validation(#[from] AppSettingsError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Store(#[from] StudyStoreError),
    #[error(transparent)]
    Settings(#[from] AppSettingsServiceError),
}
