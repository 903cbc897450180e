//! The learner's catalogue and plan settings, owned by the app root.
//!
//! Every mutation follows the same path: compute the next catalogue with the
//! pure core, persist it, then publish it to readers. Writers are serialized,
//! readers always see the last published value.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use chrono::NaiveDate;
use log::{debug, info, warn};
use storage::repository::{CatalogueRepository, Storage, UserSettingsRepository};
use storage::snapshot::Snapshot;
use study_core::Clock;
use study_core::model::{Catalogue, ItemId, PracticeQuestion, StudyContent, UserSettings};
use study_core::plan::{PlanDay, build_plan_for, find_today};
use study_core::progress::{AggregateProgress, aggregate_by_ids, aggregate_catalogue};
use study_core::revision::RevisionVault;
use study_core::syllabus::default_catalogue;
use study_core::time::parse_iso_date;

use crate::content::ContentGenerator;
use crate::error::{ContentError, StudyStoreError};

#[derive(Debug, Clone)]
struct Published {
    catalogue: Catalogue,
    settings: UserSettings,
}

pub struct StudyStore {
    clock: Clock,
    catalogues: Arc<dyn CatalogueRepository>,
    user_settings: Arc<dyn UserSettingsRepository>,
    published: RwLock<Published>,
    write_gate: tokio::sync::Mutex<()>,
    in_flight: Mutex<HashSet<ItemId>>,
}

impl StudyStore {
    /// Loads persisted state, seeding the default syllabus and a plan starting
    /// today when nothing was saved yet.
    ///
    /// # Errors
    ///
    /// Returns `StudyStoreError::Storage` if loading or seeding fails.
    pub async fn load(
        clock: Clock,
        catalogues: Arc<dyn CatalogueRepository>,
        user_settings: Arc<dyn UserSettingsRepository>,
    ) -> Result<Self, StudyStoreError> {
        let catalogue = match catalogues.load_catalogue().await? {
            Some(catalogue) => catalogue,
            None => {
                let catalogue = default_catalogue();
                catalogues.save_catalogue(&catalogue).await?;
                info!("event=store_seeded items={}", catalogue.len());
                catalogue
            }
        };

        let settings = match user_settings.get_user_settings().await? {
            Some(settings) => settings,
            None => {
                let settings = UserSettings::starting(clock.today());
                user_settings.save_user_settings(&settings).await?;
                settings
            }
        };

        debug!(
            "event=store_loaded items={} plan_start={} plan_end={}",
            catalogue.len(),
            settings.plan_start_date,
            settings.plan_end_date
        );

        Ok(Self {
            clock,
            catalogues,
            user_settings,
            published: RwLock::new(Published {
                catalogue,
                settings,
            }),
            write_gate: tokio::sync::Mutex::new(()),
            in_flight: Mutex::new(HashSet::new()),
        })
    }

    /// [`StudyStore::load`] over the repositories of a [`Storage`].
    ///
    /// # Errors
    ///
    /// Returns `StudyStoreError::Storage` if loading or seeding fails.
    pub async fn from_storage(clock: Clock, storage: &Storage) -> Result<Self, StudyStoreError> {
        Self::load(
            clock,
            Arc::clone(&storage.catalogue),
            Arc::clone(&storage.user_settings),
        )
        .await
    }

    fn read(&self) -> Published {
        self.published
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish(&self, update: impl FnOnce(&mut Published)) {
        let mut published = self
            .published
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        update(&mut published);
    }

    /// Current catalogue snapshot.
    #[must_use]
    pub fn catalogue(&self) -> Catalogue {
        self.read().catalogue
    }

    #[must_use]
    pub fn settings(&self) -> UserSettings {
        self.read().settings
    }

    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    async fn commit(
        &self,
        update: impl FnOnce(&Catalogue) -> Catalogue,
    ) -> Result<Catalogue, StudyStoreError> {
        let _gate = self.write_gate.lock().await;
        let next = update(&self.catalogue());
        self.catalogues.save_catalogue(&next).await?;
        self.publish(|published| published.catalogue = next.clone());
        Ok(next)
    }

    //
    // ─── COMPLETION ────────────────────────────────────────────────────────────
    //

    /// Flips the completion flag of `id`. Unknown ids leave the store untouched.
    ///
    /// # Errors
    ///
    /// Returns `StudyStoreError::Storage` if the new catalogue cannot be saved.
    pub async fn toggle(&self, id: &ItemId) -> Result<Catalogue, StudyStoreError> {
        let current = self.catalogue();
        if current.item(id).is_none() {
            warn!("event=item_toggled status=unknown_item id={id}");
            return Ok(current);
        }

        let next = self.commit(|catalogue| catalogue.toggle(id)).await?;
        let completed = next.item(id).is_some_and(|item| item.is_completed());
        info!("event=item_toggled id={id} completed={completed}");
        Ok(next)
    }

    /// Attaches generated material to `id`, replacing earlier material.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnknownItem` for ids outside the catalogue, or a
    /// storage error if saving fails.
    pub async fn attach_content(
        &self,
        id: &ItemId,
        content: StudyContent,
    ) -> Result<Catalogue, StudyStoreError> {
        self.ensure_known(id)?;
        let next = self
            .commit(|catalogue| catalogue.with_content(id, content))
            .await?;
        info!("event=content_attached id={id}");
        Ok(next)
    }

    /// Appends practice questions to the material of `id`.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnknownItem` or `ContentError::MissingContent`
    /// when there is nothing to extend, or a storage error if saving fails.
    pub async fn add_practice_questions(
        &self,
        id: &ItemId,
        questions: &[PracticeQuestion],
    ) -> Result<Catalogue, StudyStoreError> {
        let catalogue = self.catalogue();
        let item = catalogue
            .item(id)
            .ok_or_else(|| ContentError::UnknownItem(id.clone()))?;
        if !item.has_content() {
            return Err(ContentError::MissingContent(id.clone()).into());
        }

        let next = self
            .commit(|catalogue| catalogue.with_more_questions(id, questions))
            .await?;
        info!(
            "event=practice_questions_added id={id} added={}",
            questions.len()
        );
        Ok(next)
    }

    fn ensure_known(&self, id: &ItemId) -> Result<(), ContentError> {
        if self.catalogue().item(id).is_none() {
            return Err(ContentError::UnknownItem(id.clone()));
        }
        Ok(())
    }

    //
    // ─── PLAN ──────────────────────────────────────────────────────────────────
    //

    /// Stores a new plan range. Inverted ranges are accepted and produce an
    /// empty plan.
    ///
    /// # Errors
    ///
    /// Returns `StudyStoreError::Storage` if the settings cannot be saved.
    pub async fn set_plan_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<UserSettings, StudyStoreError> {
        let settings = UserSettings::new(start, end);
        let _gate = self.write_gate.lock().await;
        self.user_settings.save_user_settings(&settings).await?;
        self.publish(|published| published.settings = settings);
        info!("event=plan_range_set start={start} end={end}");
        Ok(settings)
    }

    /// [`StudyStore::set_plan_range`] over `YYYY-MM-DD` strings.
    ///
    /// # Errors
    ///
    /// Returns `StudyStoreError::DateParse` for malformed dates.
    pub async fn set_plan_range_iso(
        &self,
        start: &str,
        end: &str,
    ) -> Result<UserSettings, StudyStoreError> {
        let start = parse_iso_date(start)?;
        let end = parse_iso_date(end)?;
        self.set_plan_range(start, end).await
    }

    /// The plan for the stored range, recomputed from the current catalogue.
    #[must_use]
    pub fn plan(&self) -> Vec<PlanDay> {
        let Published {
            catalogue,
            settings,
        } = self.read();
        build_plan_for(&catalogue, &settings.plan_range())
    }

    /// Today's entry of the plan, if the plan covers today.
    #[must_use]
    pub fn today_plan(&self) -> Option<PlanDay> {
        let plan = self.plan();
        find_today(&plan, self.clock.today()).cloned()
    }

    //
    // ─── PROGRESS ──────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn overall_progress(&self) -> AggregateProgress {
        aggregate_catalogue(&self.catalogue())
    }

    #[must_use]
    pub fn day_progress(&self, day: &PlanDay) -> AggregateProgress {
        aggregate_by_ids(&self.catalogue(), &day.item_ids)
    }

    /// The catalogue to collect a [`RevisionVault`] from, once overall
    /// progress rounds to 100 percent.
    ///
    /// # Errors
    ///
    /// Returns `StudyStoreError::VaultLocked` while the rounded percent is
    /// below 100.
    pub fn vault(&self) -> Result<Catalogue, StudyStoreError> {
        let catalogue = self.catalogue();
        if !RevisionVault::is_unlocked(&catalogue) {
            let remaining = aggregate_catalogue(&catalogue).remaining();
            return Err(StudyStoreError::VaultLocked { remaining });
        }
        Ok(catalogue)
    }

    //
    // ─── SNAPSHOTS ─────────────────────────────────────────────────────────────
    //

    /// Pretty JSON with the catalogue and the plan settings.
    ///
    /// # Errors
    ///
    /// Returns `StudyStoreError::Snapshot` if serialization fails.
    pub fn export_snapshot(&self) -> Result<String, StudyStoreError> {
        let Published {
            catalogue,
            settings,
        } = self.read();
        Ok(Snapshot::new(catalogue, Some(settings)).to_json()?)
    }

    /// Replaces the catalogue (and the settings, when present) with an
    /// exported document or a bare topic array.
    ///
    /// # Errors
    ///
    /// Returns `StudyStoreError::Snapshot` for unreadable input, in which case
    /// nothing changes, or a storage error if saving fails.
    pub async fn import_snapshot(&self, raw: &str) -> Result<Catalogue, StudyStoreError> {
        let snapshot = Snapshot::parse(raw)?;
        let Snapshot { topics, settings } = snapshot;

        let _gate = self.write_gate.lock().await;
        self.catalogues.save_catalogue(&topics).await?;
        if let Some(settings) = settings.as_ref() {
            self.user_settings.save_user_settings(settings).await?;
        }
        self.publish(|published| {
            published.catalogue = topics.clone();
            if let Some(settings) = settings {
                published.settings = settings;
            }
        });

        info!(
            "event=snapshot_imported items={} settings={}",
            topics.len(),
            settings.is_some()
        );
        Ok(topics)
    }

    /// Drops all progress and generated material, returning to the default
    /// syllabus and a plan starting today.
    ///
    /// # Errors
    ///
    /// Returns `StudyStoreError::Storage` on storage failures.
    pub async fn reset(&self) -> Result<(), StudyStoreError> {
        let catalogue = default_catalogue();
        let settings = UserSettings::starting(self.clock.today());

        let _gate = self.write_gate.lock().await;
        self.catalogues.clear_catalogue().await?;
        self.catalogues.save_catalogue(&catalogue).await?;
        self.user_settings.save_user_settings(&settings).await?;
        self.publish(|published| {
            *published = Published {
                catalogue,
                settings,
            };
        });

        info!("event=store_reset");
        Ok(())
    }

    //
    // ─── GENERATION ────────────────────────────────────────────────────────────
    //

    fn begin_generation(&self, id: &ItemId) -> Result<InFlight<'_>, ContentError> {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(id.clone()) {
            return Err(ContentError::AlreadyInFlight(id.clone()));
        }
        Ok(InFlight {
            set: &self.in_flight,
            id: id.clone(),
        })
    }

    /// Generates and attaches study material for `id`.
    ///
    /// Items that already have material keep it unless `force` is set. Only one
    /// request per item runs at a time.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnknownItem`, `ContentError::AlreadyInFlight`, any
    /// generator failure, or a storage error if saving fails.
    pub async fn generate_content(
        &self,
        id: &ItemId,
        generator: &dyn ContentGenerator,
        force: bool,
    ) -> Result<StudyContent, StudyStoreError> {
        let catalogue = self.catalogue();
        let (category, item) = catalogue
            .find(id)
            .ok_or_else(|| ContentError::UnknownItem(id.clone()))?;

        if let (Some(existing), false) = (item.content(), force) {
            debug!("event=content_generated status=cached id={id}");
            return Ok(existing.clone());
        }

        let _in_flight = self.begin_generation(id)?;
        info!("event=content_generation status=started id={id}");
        let content = generator
            .generate_study_content(item.title(), category.label())
            .await
            .inspect_err(|err| warn!("event=content_generation status=failed id={id} error={err}"))?;

        self.attach_content(id, content.clone()).await?;
        info!("event=content_generation status=ok id={id}");
        Ok(content)
    }

    /// Requests `count` more practice questions for `id` and appends them.
    ///
    /// # Errors
    ///
    /// Returns `ContentError::UnknownItem`, `ContentError::MissingContent`,
    /// `ContentError::AlreadyInFlight`, any generator failure, or a storage
    /// error if saving fails.
    pub async fn generate_more_questions(
        &self,
        id: &ItemId,
        count: usize,
        generator: &dyn ContentGenerator,
    ) -> Result<Vec<PracticeQuestion>, StudyStoreError> {
        let catalogue = self.catalogue();
        let (category, item) = catalogue
            .find(id)
            .ok_or_else(|| ContentError::UnknownItem(id.clone()))?;
        if !item.has_content() {
            return Err(ContentError::MissingContent(id.clone()).into());
        }

        let _in_flight = self.begin_generation(id)?;
        let questions = generator
            .generate_practice_questions(item.title(), category.label(), count)
            .await
            .inspect_err(|err| warn!("event=practice_generation status=failed id={id} error={err}"))?;

        self.add_practice_questions(id, &questions).await?;
        Ok(questions)
    }

    /// Whether a generation request for `id` is currently running.
    #[must_use]
    pub fn is_generating(&self, id: &ItemId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

/// Marks an item as being generated until dropped.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<ItemId>>,
    id: ItemId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.set
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
