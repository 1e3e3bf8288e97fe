use chrono::Utc;

use crate::{
    store::models::{EntryType, PointsEntry},
    store::Store,
    Result,
};

const POINTS_COLUMNS: &str = "id, entry, entry_type, value, updated_at";

impl Store {
    /// The points row for a user, created with a zero total if it is missing.
    pub async fn find_or_create_points(&self, user_row_id: i64) -> Result<PointsEntry> {
        sqlx::query(
            "INSERT INTO points_entries (entry, entry_type, value, updated_at) VALUES (?, ?, 0, ?) \
             ON CONFLICT(entry) DO NOTHING",
        )
        .bind(user_row_id)
        .bind(EntryType::User)
        .bind(Utc::now())
        .execute(self.pool())
        .await?;

        let row = sqlx::query_as::<_, PointsEntry>(&format!(
            "SELECT {POINTS_COLUMNS} FROM points_entries WHERE entry = ?"
        ))
        .bind(user_row_id)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    /// Apply a signed delta in one statement so concurrent adjustments never lose an update.
    pub async fn adjust_points(&self, user_row_id: i64, delta: i64) -> Result<PointsEntry> {
        self.find_or_create_points(user_row_id).await?;

        let row = sqlx::query_as::<_, PointsEntry>(&format!(
            "UPDATE points_entries SET value = value + ?, updated_at = ? WHERE entry = ? \
             RETURNING {POINTS_COLUMNS}"
        ))
        .bind(delta)
        .bind(Utc::now())
        .bind(user_row_id)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    /// Every points row, highest total first. Ties keep creation order.
    pub async fn points_leaderboard(&self) -> Result<Vec<PointsEntry>> {
        let rows = sqlx::query_as::<_, PointsEntry>(&format!(
            "SELECT {POINTS_COLUMNS} FROM points_entries ORDER BY value DESC, id ASC"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}
