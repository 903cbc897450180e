use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::model::ids::{CategoryId, ItemId};
use crate::model::item::StudyItem;
use crate::model::material::{PracticeQuestion, StudyContent};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogueError {
    #[error("duplicate study item id `{0}`")]
    DuplicateItemId(ItemId),
    #[error("duplicate category id `{0}`")]
    DuplicateCategoryId(CategoryId),
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// A labelled, ordered group of study items.
///
/// On the wire this is a "topic": `{ id, category, subTopics }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    id: CategoryId,
    #[serde(rename = "category")]
    label: String,
    #[serde(rename = "subTopics", default)]
    items: Vec<Arc<StudyItem>>,
}

impl Category {
    #[must_use]
    pub fn new(
        id: impl Into<CategoryId>,
        label: impl Into<String>,
        items: impl IntoIterator<Item = StudyItem>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &CategoryId {
        &self.id
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Label without its phase prefix: `"Phase 2: Linear Algebra"` → `"Linear Algebra"`.
    #[must_use]
    pub fn short_label(&self) -> &str {
        self.label
            .split_once(':')
            .map_or(self.label.as_str(), |(_, rest)| rest.trim())
    }

    #[must_use]
    pub fn items(&self) -> &[Arc<StudyItem>] {
        &self.items
    }

    fn position_of(&self, id: &ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

//
// ─── CATALOGUE ─────────────────────────────────────────────────────────────────
//

/// The whole syllabus, in order.
///
/// Category ids are unique, and item ids are unique across every category. Derived catalogues returned by
/// [`Catalogue::toggle`] and friends share every untouched category and item
/// with their source.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "Vec<Category>")]
pub struct Catalogue {
    categories: Vec<Arc<Category>>,
}

impl Catalogue {
    /// Builds a catalogue from ordered categories.
    ///
    /// # Errors
    ///
    /// Returns `CatalogueError::DuplicateCategoryId` if two categories share an
    /// id, or `CatalogueError::DuplicateItemId` if any item id appears twice.
    pub fn new(categories: impl IntoIterator<Item = Category>) -> Result<Self, CatalogueError> {
        let categories: Vec<Arc<Category>> = categories.into_iter().map(Arc::new).collect();
        let mut category_ids = HashSet::new();
        for category in &categories {
            if !category_ids.insert(category.id()) {
                return Err(CatalogueError::DuplicateCategoryId(category.id().clone()));
            }
        }
        let mut seen = HashSet::new();
        for item in categories.iter().flat_map(|c| c.items.iter()) {
            if !seen.insert(item.id()) {
                return Err(CatalogueError::DuplicateItemId(item.id().clone()));
            }
        }
        Ok(Self { categories })
    }

    #[must_use]
    pub fn categories(&self) -> &[Arc<Category>] {
        &self.categories
    }

    /// All items in canonical order: category order, then within-category order.
    pub fn items(&self) -> impl Iterator<Item = &StudyItem> + '_ {
        self.categories
            .iter()
            .flat_map(|category| category.items.iter().map(|item| &**item))
    }

    /// Item ids in canonical order.
    #[must_use]
    pub fn flatten_ids(&self) -> Vec<ItemId> {
        self.items().map(|item| item.id().clone()).collect()
    }

    /// Total number of items across all categories.
    #[must_use]
    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.items.len()).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn item(&self, id: &ItemId) -> Option<&StudyItem> {
        self.find(id).map(|(_, item)| item)
    }

    /// Returns the item with `id` and the category that owns it.
    #[must_use]
    pub fn find(&self, id: &ItemId) -> Option<(&Category, &StudyItem)> {
        self.categories.iter().find_map(|category| {
            category
                .position_of(id)
                .map(|idx| (&**category, &*category.items[idx]))
        })
    }

    /// Lookup table from id to item, for resolving many ids at once.
    #[must_use]
    pub fn index(&self) -> HashMap<&ItemId, &StudyItem> {
        self.items().map(|item| (item.id(), item)).collect()
    }

    /// Returns a catalogue with the completion flag of `id` inverted.
    ///
    /// Unknown ids yield a catalogue equal to `self`.
    #[must_use]
    pub fn toggle(&self, id: &ItemId) -> Catalogue {
        self.replace_item(id, |item| Some(item.toggled()))
    }

    /// Returns a catalogue with `content` attached to `id`, replacing any
    /// previous content.
    #[must_use]
    pub fn with_content(&self, id: &ItemId, content: StudyContent) -> Catalogue {
        self.replace_item(id, |item| Some(item.clone().with_content(content)))
    }

    /// Returns a catalogue with `questions` appended to the practice questions
    /// of `id`. Items without content are left as they are.
    #[must_use]
    pub fn with_more_questions(&self, id: &ItemId, questions: &[PracticeQuestion]) -> Catalogue {
        self.replace_item(id, |item| item.with_more_questions(questions))
    }

    fn replace_item(
        &self,
        id: &ItemId,
        update: impl FnOnce(&StudyItem) -> Option<StudyItem>,
    ) -> Catalogue {
        let located = self
            .categories
            .iter()
            .enumerate()
            .find_map(|(cat_idx, category)| category.position_of(id).map(|idx| (cat_idx, idx)));
        let Some((cat_idx, item_idx)) = located else {
            return self.clone();
        };

        let source = &self.categories[cat_idx];
        let Some(replacement) = update(&source.items[item_idx]) else {
            return self.clone();
        };

        let mut items = source.items.clone();
        items[item_idx] = Arc::new(replacement);
        let mut categories = self.categories.clone();
        categories[cat_idx] = Arc::new(Category {
            id: source.id.clone(),
            label: source.label.clone(),
            items,
        });
        Catalogue { categories }
    }
}

impl TryFrom<Vec<Category>> for Catalogue {
    type Error = CatalogueError;

    fn try_from(categories: Vec<Category>) -> Result<Self, Self::Error> {
        Catalogue::new(categories)
    }
}

impl Serialize for Catalogue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.categories.iter().map(|category| &**category))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
