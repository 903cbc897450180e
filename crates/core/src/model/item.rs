use serde::{Deserialize, Serialize};

use crate::model::ids::ItemId;
use crate::model::material::{PracticeQuestion, StudyContent};

/// A single trackable unit of study.
///
/// Items are immutable values: every change produces a new item so that
/// catalogues can share untouched entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyItem {
    id: ItemId,
    title: String,
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<StudyContent>,
}

impl StudyItem {
    /// Creates an incomplete item without generated content.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            completed: false,
            content: None,
        }
    }

    #[must_use]
    pub fn with_completed(mut self, completed: bool) -> Self {
        self.completed = completed;
        self
    }

    #[must_use]
    pub fn with_content(mut self, content: StudyContent) -> Self {
        self.content = Some(content);
        self
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn content(&self) -> Option<&StudyContent> {
        self.content.as_ref()
    }

    #[must_use]
    pub fn has_content(&self) -> bool {
        self.content.is_some()
    }

    /// Copy of this item with the completion flag inverted.
    #[must_use]
    pub(crate) fn toggled(&self) -> Self {
        Self {
            completed: !self.completed,
            ..self.clone()
        }
    }

    /// Copy of this item with extra practice questions, or `None` when the
    /// item has no content to extend.
    #[must_use]
    pub(crate) fn with_more_questions(&self, questions: &[PracticeQuestion]) -> Option<Self> {
        let content = self.content.as_ref()?;
        Some(Self {
            content: Some(content.with_more_questions(questions)),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_starts_incomplete_without_content() {
        let item = StudyItem::new("ps-1", "Counting & Axioms of Probability");
        assert_eq!(item.id().as_str(), "ps-1");
        assert!(!item.is_completed());
        assert!(!item.has_content());
    }

    #[test]
    fn toggled_flips_only_the_flag() {
        let item = StudyItem::new("ps-1", "Counting").with_completed(true);
        let flipped = item.toggled();
        assert!(!flipped.is_completed());
        assert_eq!(flipped.title(), item.title());
        assert_eq!(flipped.toggled(), item);
    }

    #[test]
    fn deserializes_legacy_item_without_flag() {
        let item: StudyItem = serde_json::from_str(r#"{"id":"la-1","title":"Vectors"}"#).unwrap();
        assert!(!item.is_completed());
        assert!(item.content().is_none());
    }

    #[test]
    fn rejects_item_with_blank_id() {
        let result = serde_json::from_str::<StudyItem>(r#"{"id":"","title":"Vectors"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn serialization_omits_missing_content() {
        let json = serde_json::to_value(StudyItem::new("la-1", "Vectors")).unwrap();
        assert!(json.get("content").is_none());
        assert_eq!(json["completed"], false);
    }
}
