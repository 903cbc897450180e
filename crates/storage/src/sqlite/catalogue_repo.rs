use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use study_core::model::{Catalogue, Category, StudyItem};

use super::SqliteRepository;
use super::mapping::{conn, content_to_json, map_item_row, position_to_i64, ser};
use crate::repository::{CatalogueRepository, StorageError};

#[async_trait]
impl CatalogueRepository for SqliteRepository {
    async fn load_catalogue(&self) -> Result<Option<Catalogue>, StorageError> {
        let saved = sqlx::query("SELECT 1 FROM catalogue_state WHERE id = 1")
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;
        if saved.is_none() {
            return Ok(None);
        }

        let category_rows = sqlx::query("SELECT id, label FROM categories ORDER BY position")
            .fetch_all(&self.pool)
            .await
            .map_err(conn)?;

        let item_rows = sqlx::query(
            r"
            SELECT id, category_id, title, completed, content_json
            FROM study_items
            ORDER BY category_id, position
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        let mut items_by_category: HashMap<String, Vec<StudyItem>> = HashMap::new();
        for row in &item_rows {
            let (category_id, item) = map_item_row(row)?;
            items_by_category.entry(category_id).or_default().push(item);
        }

        let mut categories = Vec::with_capacity(category_rows.len());
        for row in &category_rows {
            let id: String = row.try_get("id").map_err(ser)?;
            let label: String = row.try_get("label").map_err(ser)?;
            let items = items_by_category.remove(&id).unwrap_or_default();
            categories.push(Category::new(id.as_str(), label, items));
        }

        Catalogue::new(categories).map(Some).map_err(ser)
    }

    async fn save_catalogue(&self, catalogue: &Catalogue) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query("DELETE FROM study_items")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        sqlx::query("DELETE FROM categories")
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        for (cat_pos, category) in catalogue.categories().iter().enumerate() {
            sqlx::query("INSERT INTO categories (id, position, label) VALUES (?1, ?2, ?3)")
                .bind(category.id().as_str())
                .bind(position_to_i64(cat_pos)?)
                .bind(category.label())
                .execute(&mut *tx)
                .await
                .map_err(conn)?;

            for (item_pos, item) in category.items().iter().enumerate() {
                sqlx::query(
                    r"
                    INSERT INTO study_items (id, category_id, position, title, completed, content_json)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    ",
                )
                .bind(item.id().as_str())
                .bind(category.id().as_str())
                .bind(position_to_i64(item_pos)?)
                .bind(item.title())
                .bind(item.is_completed())
                .bind(content_to_json(item.content())?)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
            }
        }

        sqlx::query(
            r"
            INSERT INTO catalogue_state (id, saved_at)
            VALUES (1, ?1)
            ON CONFLICT(id) DO UPDATE SET saved_at = excluded.saved_at
            ",
        )
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn clear_catalogue(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for statement in [
            "DELETE FROM study_items",
            "DELETE FROM categories",
            "DELETE FROM catalogue_state",
        ] {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
