//! Completion statistics over the catalogue or any subset of it.

use serde::Serialize;

use crate::model::{Catalogue, CategoryId, ItemId, StudyItem};

/// Completed/total/percent triple. Always derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AggregateProgress {
    pub completed: usize,
    pub total: usize,
    /// `round(100 * completed / total)`, or 0 when `total` is 0.
    pub percent: u8,
}

impl AggregateProgress {
    #[must_use]
    pub fn from_counts(completed: usize, total: usize) -> Self {
        let completed = completed.min(total);
        Self {
            completed,
            total,
            percent: percent_of(completed, total),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.total - self.completed
    }

    /// True when there is at least one item and all of them are completed.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    /// Completed share in `[0, 1]`, or 0 for an empty set.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.completed as f64 / self.total as f64
    }
}

#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn percent_of(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // Half-up rounding on the float ratio; the result is within 0..=100.
    let percent = (completed as f64 / total as f64 * 100.0).round();
    percent.clamp(0.0, 100.0) as u8
}

/// Aggregates a sequence of items.
#[must_use]
pub fn aggregate<'a>(items: impl IntoIterator<Item = &'a StudyItem>) -> AggregateProgress {
    let (completed, total) = items.into_iter().fold((0, 0), |(done, total), item| {
        (done + usize::from(item.is_completed()), total + 1)
    });
    AggregateProgress::from_counts(completed, total)
}

/// Aggregates the items named by `ids`.
///
/// Every entry of `ids` counts toward `total` exactly once. An entry counts
/// toward `completed` only if it resolves to an item that is marked complete;
/// ids missing from the catalogue count as not completed.
#[must_use]
pub fn aggregate_by_ids<'a>(
    catalogue: &Catalogue,
    ids: impl IntoIterator<Item = &'a ItemId>,
) -> AggregateProgress {
    let index = catalogue.index();
    let (completed, total) = ids.into_iter().fold((0, 0), |(done, total), id| {
        let is_done = index.get(id).is_some_and(|item| item.is_completed());
        (done + usize::from(is_done), total + 1)
    });
    AggregateProgress::from_counts(completed, total)
}

/// Aggregates the whole catalogue.
#[must_use]
pub fn aggregate_catalogue(catalogue: &Catalogue) -> AggregateProgress {
    aggregate(catalogue.items())
}

/// Per-category progress, in catalogue order.
#[must_use]
pub fn aggregate_by_category(catalogue: &Catalogue) -> Vec<(CategoryId, AggregateProgress)> {
    catalogue
        .categories()
        .iter()
        .map(|category| {
            let progress = aggregate(category.items().iter().map(|item| &**item));
            (category.id().clone(), progress)
        })
        .collect()
}

//
// ─── DASHBOARD ─────────────────────────────────────────────────────────────────
//

/// Named stage of the overall journey, derived from the completion percent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExpeditionStage {
    Trailhead,
    Foothills,
    AlpineMeadows,
    GlacierPass,
    ThinAir,
    BaseCamp,
}

impl ExpeditionStage {
    #[must_use]
    pub fn from_percent(percent: u8) -> Self {
        match percent {
            0 => Self::Trailhead,
            1..=24 => Self::Foothills,
            25..=49 => Self::AlpineMeadows,
            50..=74 => Self::GlacierPass,
            75..=99 => Self::ThinAir,
            _ => Self::BaseCamp,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Trailhead => "At the Trailhead",
            Self::Foothills => "Lush Foothills",
            Self::AlpineMeadows => "Alpine Meadows",
            Self::GlacierPass => "Glacier Pass",
            Self::ThinAir => "The Thin Air",
            Self::BaseCamp => "Base Camp Secured!",
        }
    }
}

/// Rough exam-rank band implied by overall completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankBand {
    Unranked,
    Top25000,
    Top5000,
    Top2500,
    Top1000,
    Under500,
    Under100,
}

impl RankBand {
    #[must_use]
    pub fn estimate(progress: &AggregateProgress) -> Self {
        if progress.completed == 0 {
            return Self::Unranked;
        }
        let score = progress.ratio();
        if score > 0.95 {
            Self::Under100
        } else if score > 0.85 {
            Self::Under500
        } else if score > 0.70 {
            Self::Top1000
        } else if score > 0.50 {
            Self::Top2500
        } else if score > 0.30 {
            Self::Top5000
        } else {
            Self::Top25000
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Unranked => "50,000+",
            Self::Top25000 => "Top 25,000",
            Self::Top5000 => "Top 5,000",
            Self::Top2500 => "Top 2,500",
            Self::Top1000 => "Top 1,000",
            Self::Under500 => "Under 500",
            Self::Under100 => "Under 100",
        }
    }
}
