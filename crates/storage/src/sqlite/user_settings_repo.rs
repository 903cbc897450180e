use async_trait::async_trait;
use sqlx::Row;
use study_core::model::UserSettings;

use super::SqliteRepository;
use super::mapping::{conn, date_from_text, date_to_text, ser};
use crate::repository::{StorageError, UserSettingsRepository};

#[async_trait]
impl UserSettingsRepository for SqliteRepository {
    async fn get_user_settings(&self) -> Result<Option<UserSettings>, StorageError> {
        let row = sqlx::query(
            "SELECT plan_start_date, plan_end_date FROM user_settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        let Some(row) = row else {
            return Ok(None);
        };

        let start: String = row.try_get("plan_start_date").map_err(ser)?;
        let end: String = row.try_get("plan_end_date").map_err(ser)?;
        Ok(Some(UserSettings::new(
            date_from_text(&start)?,
            date_from_text(&end)?,
        )))
    }

    async fn save_user_settings(&self, settings: &UserSettings) -> Result<(), StorageError> {
        sqlx::query(
            r"
            INSERT INTO user_settings (id, plan_start_date, plan_end_date)
            VALUES (1, ?1, ?2)
            ON CONFLICT(id) DO UPDATE SET
                plan_start_date = excluded.plan_start_date,
                plan_end_date = excluded.plan_end_date
            ",
        )
        .bind(date_to_text(settings.plan_start_date))
        .bind(date_to_text(settings.plan_end_date))
        .execute(&self.pool)
        .await
        .map_err(conn)?;
        Ok(())
    }
}
