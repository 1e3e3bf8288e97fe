use chrono::Utc;
use tracing::debug;

use crate::{domain::UserId, store::models::User, store::Store, Result};

const USER_COLUMNS: &str = "id, discord_id, created_at, updated_at";

impl Store {
    /// Return the row for `discord`, creating it first if needed.
    ///
    /// Safe under concurrent callers: the insert is a no-op on conflict and the
    /// row is always re-read.
    pub async fn find_or_create_user(&self, discord: UserId) -> Result<User> {
        let now = Utc::now();
        let inserted = sqlx::query(
            "INSERT INTO users (discord_id, created_at, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(discord_id) DO NOTHING",
        )
        .bind(discord.as_key())
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?
        .rows_affected();

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE discord_id = ?"
        ))
        .bind(discord.as_key())
        .fetch_one(self.pool())
        .await?;

        debug!(discord_id = %discord, id = user.id, created = inserted == 1, "find_or_create_user");
        Ok(user)
    }

    pub async fn find_user(&self, id: i64) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(user)
    }

    pub async fn all_users(&self) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))
            .fetch_all(self.pool())
            .await?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let store = Store::open_in_memory().await.unwrap();

        let a = store.find_or_create_user(UserId(10)).await.unwrap();
        let b = store.find_or_create_user(UserId(10)).await.unwrap();
        assert_eq!(a.id, b.id);
        assert_eq!(a.platform_id(), Some(UserId(10)));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(store.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);

        let other = store.find_or_create_user(UserId(11)).await.unwrap();
        assert_ne!(other.id, a.id);
        assert_eq!(store.all_users().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn find_user_by_row_id() {
        let store = Store::open_in_memory().await.unwrap();
        let u = store.find_or_create_user(UserId(5)).await.unwrap();

        assert_eq!(store.find_user(u.id).await.unwrap(), Some(u));
        assert_eq!(store.find_user(999).await.unwrap(), None);
    }
}
