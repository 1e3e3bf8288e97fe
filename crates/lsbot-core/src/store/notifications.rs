//! Channel/subject subscriptions. The tables are kept in sync with the schema
//! but no command writes them yet.

use chrono::{DateTime, Utc};

use crate::{
    store::models::{Channel, Notification, Subject, SubjectType},
    store::Store,
    Result,
};

impl Store {
    pub async fn insert_channel(&self, discord_id: &str) -> Result<Channel> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Channel>(
            "INSERT INTO channels (discord_id, created_at, updated_at) VALUES (?, ?, ?) \
             RETURNING id, discord_id",
        )
        .bind(discord_id)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn delete_channel(&self, id: i64) -> Result<bool> {
        let done = sqlx::query("DELETE FROM channels WHERE id = ?")
            .bind(id)
            .execute(self.pool())
            .await?;
        Ok(done.rows_affected() > 0)
    }

    pub async fn insert_subject(
        &self,
        discord_id: &str,
        subject_type: SubjectType,
        last_updated_time: Option<DateTime<Utc>>,
    ) -> Result<Subject> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Subject>(
            "INSERT INTO subjects (discord_id, last_updated_time, subject_type, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING id, discord_id, last_updated_time, subject_type",
        )
        .bind(discord_id)
        .bind(last_updated_time)
        .bind(subject_type)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn insert_notification(
        &self,
        channel_id: i64,
        subject_id: i64,
        user_id: i64,
        progress: Option<i64>,
    ) -> Result<Notification> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (channel_id, subject_id, user_id, active, progress, created_at, updated_at) \
             VALUES (?, ?, ?, 1, ?, ?, ?) \
             RETURNING id, channel_id, subject_id, user_id, active, progress",
        )
        .bind(channel_id)
        .bind(subject_id)
        .bind(user_id)
        .bind(progress)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn notifications_for_user(&self, user_id: i64) -> Result<Vec<Notification>> {
        let rows = sqlx::query_as::<_, Notification>(
            "SELECT id, channel_id, subject_id, user_id, active, progress \
             FROM notifications WHERE user_id = ? ORDER BY id",
        )
        .bind(user_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    #[tokio::test]
    async fn deleting_a_channel_cascades_to_its_notifications() {
        let store = Store::open_in_memory().await.unwrap();
        let user = store.find_or_create_user(UserId(9)).await.unwrap();
        let channel = store.insert_channel("100").await.unwrap();
        let subject = store
            .insert_subject("21", SubjectType::Manga, None)
            .await
            .unwrap();
        assert_eq!(subject.subject_type, SubjectType::Manga);

        let n = store
            .insert_notification(channel.id, subject.id, user.id, Some(3))
            .await
            .unwrap();
        assert!(n.active);
        assert_eq!(n.progress, Some(3));
        assert_eq!(store.notifications_for_user(user.id).await.unwrap().len(), 1);

        assert!(store.delete_channel(channel.id).await.unwrap());
        assert!(store.notifications_for_user(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn notification_requires_existing_rows() {
        let store = Store::open_in_memory().await.unwrap();
        assert!(store.insert_notification(1, 2, 3, None).await.is_err());
    }
}
