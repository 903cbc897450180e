use sqlx::Row;
use sqlx::sqlite::SqliteRow;
use study_core::model::{StudyContent, StudyItem};
use study_core::time::{format_iso_date, parse_iso_date};

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

pub(crate) fn position_to_i64(position: usize) -> Result<i64, StorageError> {
    i64::try_from(position).map_err(|_| StorageError::Serialization("position overflow".into()))
}

pub(crate) fn content_to_json(content: Option<&StudyContent>) -> Result<Option<String>, StorageError> {
    content.map(serde_json::to_string).transpose().map_err(ser)
}

fn content_from_json(raw: Option<String>) -> Result<Option<StudyContent>, StorageError> {
    raw.map(|json| serde_json::from_str(&json))
        .transpose()
        .map_err(ser)
}

/// Maps a `study_items` row to `(category_id, item)`.
pub(crate) fn map_item_row(row: &SqliteRow) -> Result<(String, StudyItem), StorageError> {
    let id: String = row.try_get("id").map_err(ser)?;
    let category_id: String = row.try_get("category_id").map_err(ser)?;
    let title: String = row.try_get("title").map_err(ser)?;
    let completed: bool = row.try_get("completed").map_err(ser)?;
    let content = content_from_json(row.try_get("content_json").map_err(ser)?)?;

    let mut item = StudyItem::new(id.as_str(), title).with_completed(completed);
    if let Some(content) = content {
        item = item.with_content(content);
    }
    Ok((category_id, item))
}

pub(crate) fn date_to_text(date: chrono::NaiveDate) -> String {
    format_iso_date(date)
}

pub(crate) fn date_from_text(raw: &str) -> Result<chrono::NaiveDate, StorageError> {
    parse_iso_date(raw).map_err(ser)
}
