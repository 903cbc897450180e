use std::sync::Arc;

use services::{StudyStore, StudyStoreError};
use storage::repository::{
    CatalogueRepository, InMemoryRepository, Storage, UserSettingsRepository,
};
use study_core::model::{ItemId, UserSettings};
use study_core::plan::MAX_PLAN_DAYS;
use study_core::syllabus::default_catalogue;
use study_core::time::{fixed_clock, fixed_today, parse_iso_date};

async fn store_over(repo: &InMemoryRepository) -> StudyStore {
    StudyStore::load(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo.clone()))
        .await
        .unwrap()
}

#[tokio::test]
async fn first_load_seeds_and_persists_defaults() {
    let repo = InMemoryRepository::new();
    let store = store_over(&repo).await;

    assert_eq!(store.catalogue(), default_catalogue());
    assert_eq!(store.settings(), UserSettings::starting(fixed_today()));
    assert_eq!(repo.load_catalogue().await.unwrap(), Some(default_catalogue()));
    assert_eq!(
        repo.get_user_settings().await.unwrap(),
        Some(UserSettings::starting(fixed_today()))
    );
}

#[tokio::test]
async fn toggle_persists_and_survives_reload() {
    let repo = InMemoryRepository::new();
    let store = store_over(&repo).await;
    let id = ItemId::new("ml-2");

    let next = store.toggle(&id).await.unwrap();
    assert!(next.item(&id).unwrap().is_completed());
    assert_eq!(store.overall_progress().completed, 1);

    let reloaded = store_over(&repo).await;
    assert!(reloaded.catalogue().item(&id).unwrap().is_completed());

    store.toggle(&id).await.unwrap();
    assert_eq!(store.catalogue(), default_catalogue());
}

#[tokio::test]
async fn toggle_unknown_id_changes_nothing() {
    let store = store_over(&InMemoryRepository::new()).await;
    let before = store.catalogue();
    let after = store.toggle(&ItemId::new("nope")).await.unwrap();
    assert_eq!(after, before);
    assert_eq!(store.overall_progress().completed, 0);
}

#[tokio::test]
async fn default_plan_spreads_syllabus_over_eleven_days() {
    let store = store_over(&InMemoryRepository::new()).await;
    let plan = store.plan();

    // 29 items over 11 days: ceil(29/11) = 3 per day, ten days needed.
    assert_eq!(plan.len(), 10);
    assert_eq!(plan[0].date, fixed_today());
    assert_eq!(plan[0].item_ids.len(), 3);
    assert_eq!(plan[9].item_ids.len(), 2);
    assert_eq!(store.today_plan().map(|d| d.day), Some(1));
}

#[tokio::test]
async fn day_progress_follows_toggles() {
    let store = store_over(&InMemoryRepository::new()).await;
    let first_day = store.plan().remove(0);
    assert_eq!(store.day_progress(&first_day).percent, 0);

    store.toggle(&first_day.item_ids[0]).await.unwrap();
    let progress = store.day_progress(&first_day);
    assert_eq!((progress.completed, progress.total, progress.percent), (1, 3, 33));
}

#[tokio::test]
async fn plan_range_is_stored_and_reshapes_plan() {
    let repo = InMemoryRepository::new();
    let store = store_over(&repo).await;

    store
        .set_plan_range_iso("2026-01-01", "2026-01-01")
        .await
        .unwrap();
    assert_eq!(store.plan().len(), 1);
    assert_eq!(store.plan()[0].item_ids.len(), 29);
    assert_eq!(
        repo.get_user_settings().await.unwrap().map(|s| s.plan_end_date),
        parse_iso_date("2026-01-01").ok()
    );

    store
        .set_plan_range_iso("2026-01-01", "2027-01-01")
        .await
        .unwrap();
    assert!(store.plan().len() <= MAX_PLAN_DAYS);

    store
        .set_plan_range_iso("2026-02-01", "2026-01-01")
        .await
        .unwrap();
    assert!(store.plan().is_empty());
    assert!(store.today_plan().is_none());
}

#[tokio::test]
async fn malformed_range_is_rejected_without_change() {
    let store = store_over(&InMemoryRepository::new()).await;
    let before = store.settings();
    let err = store
        .set_plan_range_iso("2026-01-01", "tomorrow")
        .await
        .unwrap_err();
    assert!(matches!(err, StudyStoreError::DateParse(_)));
    assert_eq!(store.settings(), before);
}

#[tokio::test]
async fn export_then_import_into_fresh_store() {
    let source = store_over(&InMemoryRepository::new()).await;
    source.toggle(&ItemId::new("ps-3")).await.unwrap();
    source
        .set_plan_range_iso("2026-03-01", "2026-03-20")
        .await
        .unwrap();
    let exported = source.export_snapshot().unwrap();

    let target = store_over(&InMemoryRepository::new()).await;
    target.import_snapshot(&exported).await.unwrap();
    assert_eq!(target.catalogue(), source.catalogue());
    assert_eq!(target.settings(), source.settings());
}

#[tokio::test]
async fn legacy_import_keeps_current_settings() {
    let store = store_over(&InMemoryRepository::new()).await;
    let settings = store.settings();
    let raw = r#"[{"id":"x","category":"Phase 1: Extra","subTopics":[
        {"id":"x-1","title":"One","completed":true},
        {"id":"x-2","title":"Two","completed":false}
    ]}]"#;

    store.import_snapshot(raw).await.unwrap();
    assert_eq!(store.catalogue().len(), 2);
    assert_eq!(store.overall_progress().percent, 50);
    assert_eq!(store.settings(), settings);
}

#[tokio::test]
async fn invalid_import_leaves_state_untouched() {
    let store = store_over(&InMemoryRepository::new()).await;
    store.toggle(&ItemId::new("la-1")).await.unwrap();
    let before = store.catalogue();

    let err = store.import_snapshot("{ not json").await.unwrap_err();
    assert!(matches!(err, StudyStoreError::Snapshot(_)));
    assert_eq!(store.catalogue(), before);
}

#[tokio::test]
async fn reset_restores_defaults() {
    let repo = InMemoryRepository::new();
    let store = store_over(&repo).await;
    store.toggle(&ItemId::new("db-1")).await.unwrap();
    store
        .set_plan_range_iso("2026-01-01", "2026-01-02")
        .await
        .unwrap();

    store.reset().await.unwrap();
    assert_eq!(store.catalogue(), default_catalogue());
    assert_eq!(store.settings(), UserSettings::starting(fixed_today()));
    assert_eq!(repo.load_catalogue().await.unwrap(), Some(default_catalogue()));
}

#[tokio::test]
async fn vault_opens_only_when_everything_is_done() {
    let store = store_over(&InMemoryRepository::new()).await;
    let err = store.vault().unwrap_err();
    assert!(matches!(err, StudyStoreError::VaultLocked { remaining: 29 }));

    for id in default_catalogue().flatten_ids() {
        store.toggle(&id).await.unwrap();
    }
    assert!(store.overall_progress().is_done());
    assert_eq!(store.vault().unwrap().len(), 29);
}

#[tokio::test]
async fn from_storage_uses_bundled_repositories() {
    let storage = Storage::in_memory();
    let store = StudyStore::from_storage(fixed_clock(), &storage).await.unwrap();
    store.toggle(&ItemId::new("ai-3")).await.unwrap();

    let persisted = storage.catalogue.load_catalogue().await.unwrap().unwrap();
    assert!(persisted.item(&ItemId::new("ai-3")).unwrap().is_completed());
}

#[tokio::test]
async fn empty_import_gives_empty_plan_over_valid_range() {
    let store = store_over(&InMemoryRepository::new()).await;
    store.import_snapshot(r#"{"topics":[]}"#).await.unwrap();

    assert!(store.plan().is_empty());
    assert!(store.settings().plan_range().is_valid());
}
