use chrono::Utc;

use crate::{
    store::models::{NewTrackedShow, TrackedShow},
    store::Store,
    Result,
};

const TRACK_COLUMNS: &str =
    "id, show_id, name, episodes_watched, latest_episode, airing, created_at, updated_at";

impl Store {
    /// Insert or overwrite the row for `show.show_id`. `created_at` survives an overwrite.
    pub async fn upsert_show(&self, show: NewTrackedShow) -> Result<TrackedShow> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, TrackedShow>(&format!(
            "INSERT INTO track (show_id, name, episodes_watched, latest_episode, airing, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) \
             ON CONFLICT(show_id) DO UPDATE SET \
                name = excluded.name, \
                episodes_watched = excluded.episodes_watched, \
                latest_episode = excluded.latest_episode, \
                airing = excluded.airing, \
                updated_at = excluded.updated_at \
             RETURNING {TRACK_COLUMNS}"
        ))
        .bind(show.show_id)
        .bind(show.name)
        .bind(show.episodes_watched)
        .bind(show.latest_episode)
        .bind(show.airing)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn find_show(&self, show_id: i64) -> Result<Option<TrackedShow>> {
        let row = sqlx::query_as::<_, TrackedShow>(&format!(
            "SELECT {TRACK_COLUMNS} FROM track WHERE show_id = ?"
        ))
        .bind(show_id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    /// Returns whether a row was removed.
    pub async fn delete_show(&self, show_id: i64) -> Result<bool> {
        let done = sqlx::query("DELETE FROM track WHERE show_id = ?")
            .bind(show_id)
            .execute(self.pool())
            .await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn all_shows(&self) -> Result<Vec<TrackedShow>> {
        let rows = sqlx::query_as::<_, TrackedShow>(&format!(
            "SELECT {TRACK_COLUMNS} FROM track ORDER BY id"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    /// Store what the metadata service currently reports. `updated_at` tracks
    /// when the group last watched, so it is left alone here.
    pub async fn record_latest_episode(
        &self,
        show_id: i64,
        latest_episode: i64,
        airing: bool,
    ) -> Result<()> {
        sqlx::query("UPDATE track SET latest_episode = ?, airing = ? WHERE show_id = ?")
            .bind(latest_episode)
            .bind(airing)
            .bind(show_id)
            .execute(self.pool())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn show(id: i64, watched: i64, latest: i64) -> NewTrackedShow {
        NewTrackedShow {
            show_id: id,
            name: format!("Show {id}"),
            episodes_watched: watched,
            latest_episode: latest,
            airing: true,
        }
    }

    #[tokio::test]
    async fn upsert_keeps_one_row_per_show() {
        let store = Store::open_in_memory().await.unwrap();

        let first = store.upsert_show(show(20, 1, 5)).await.unwrap();
        let second = store.upsert_show(show(20, 3, 6)).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.episodes_watched, 3);
        assert_eq!(second.latest_episode, 6);
        assert_eq!(second.created_at, first.created_at);
        assert_eq!(store.all_shows().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_reports_whether_anything_was_removed() {
        let store = Store::open_in_memory().await.unwrap();
        store.upsert_show(show(1, 0, 12)).await.unwrap();

        assert!(!store.delete_show(2).await.unwrap());
        assert!(store.find_show(1).await.unwrap().is_some());

        assert!(store.delete_show(1).await.unwrap());
        assert!(store.find_show(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn record_latest_episode_leaves_watch_time() {
        let store = Store::open_in_memory().await.unwrap();
        let before = store.upsert_show(show(7, 2, 4)).await.unwrap();

        store.record_latest_episode(7, 5, false).await.unwrap();
        let after = store.find_show(7).await.unwrap().unwrap();

        assert_eq!(after.latest_episode, 5);
        assert!(!after.airing);
        assert_eq!(after.episodes_watched, 2);
        assert_eq!(after.updated_at, before.updated_at);
    }
}
