//! JSON import/export of the learner's progress.
//!
//! Exports are `{ "topics": [...], "settings": {...} }`. Imports also accept a
//! bare array of topics, the format written by older versions.

use serde::{Deserialize, Serialize};
use study_core::model::{Catalogue, UserSettings};
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot is not valid progress JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// A catalogue plus optional plan settings, as exchanged in files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub topics: Catalogue,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<UserSettings>,
}

impl Snapshot {
    #[must_use]
    pub fn new(topics: Catalogue, settings: Option<UserSettings>) -> Self {
        Self { topics, settings }
    }

    /// Parse an exported document or a bare topic array.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::InvalidJson` if the input matches neither shape,
    /// including catalogues with duplicate item or category ids.
    pub fn parse(raw: &str) -> Result<Self, SnapshotError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        if value.is_array() {
            let topics: Catalogue = serde_json::from_value(value)?;
            return Ok(Self::new(topics, None));
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Pretty-printed export document.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::InvalidJson` if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use study_core::model::ItemId;
    use study_core::syllabus::default_catalogue;
    use study_core::time::fixed_today;

    #[test]
    fn export_then_import_preserves_progress() {
        let topics = default_catalogue().toggle(&ItemId::new("la-2"));
        let snapshot = Snapshot::new(topics, Some(UserSettings::starting(fixed_today())));

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"topics\""));
        assert!(json.contains("\"planStartDate\": \"2023-11-14\""));

        assert_eq!(Snapshot::parse(&json).unwrap(), snapshot);
    }

    #[test]
    fn imports_legacy_bare_array() {
        let raw = r#"[{"id":"t","category":"Phase 1: Stats","subTopics":[
            {"id":"ps-1","title":"Counting","completed":true}
        ]}]"#;
        let snapshot = Snapshot::parse(raw).unwrap();
        assert!(snapshot.settings.is_none());
        assert!(snapshot.topics.item(&ItemId::new("ps-1")).unwrap().is_completed());
    }

    #[test]
    fn imports_document_without_settings() {
        let raw = r#"{"topics":[]}"#;
        let snapshot = Snapshot::parse(raw).unwrap();
        assert!(snapshot.topics.is_empty());
        assert!(snapshot.settings.is_none());
    }

    #[test]
    fn rejects_garbage_and_duplicates() {
        assert!(Snapshot::parse("not json").is_err());
        assert!(Snapshot::parse(r#"{"settings":{}}"#).is_err());
        let dup = r#"[{"id":"a","category":"A","subTopics":[
            {"id":"x","title":"X"},{"id":"x","title":"X again"}
        ]}]"#;
        assert!(Snapshot::parse(dup).is_err());
    }

    #[test]
    fn rejects_topics_sharing_a_category_id() {
        let raw = r#"[
            {"id":"phase","category":"A","subTopics":[{"id":"a-1","title":"One"}]},
            {"id":"phase","category":"B","subTopics":[{"id":"b-1","title":"Two"}]}
        ]"#;
        let err = Snapshot::parse(raw).unwrap_err();
        assert!(err.to_string().contains("duplicate category id `phase`"));
    }
}
