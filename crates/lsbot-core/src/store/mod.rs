//! SQLite persistence.
//!
//! All datastore access goes through [`Store`]. Rows come back as plain structs
//! from [`models`]; handlers never hold a connection.

use std::{path::Path, str::FromStr, time::Duration};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::Result;

pub mod list;
pub mod models;
pub mod notifications;
pub mod points;
pub mod track;
pub mod users;

/// Tables are created in dependency order; foreign keys are enforced per connection.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        discord_id TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS channels (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        discord_id TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS subjects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        discord_id TEXT NOT NULL,
        last_updated_time TEXT,
        subject_type INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS notifications (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        channel_id INTEGER NOT NULL REFERENCES channels(id) ON DELETE CASCADE ON UPDATE CASCADE,
        subject_id INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE ON UPDATE CASCADE,
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE ON UPDATE CASCADE,
        active INTEGER NOT NULL,
        progress INTEGER,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS list_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry INTEGER NOT NULL REFERENCES users(id) ON UPDATE CASCADE,
        entry_type INTEGER NOT NULL,
        time_added TEXT NOT NULL,
        added_by INTEGER NOT NULL REFERENCES users(id) ON UPDATE CASCADE,
        reason TEXT
    )"#,
    "CREATE INDEX IF NOT EXISTS list_entries_entry_idx ON list_entries(entry)",
    r#"CREATE TABLE IF NOT EXISTS points_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        entry INTEGER NOT NULL UNIQUE REFERENCES users(id) ON UPDATE CASCADE,
        entry_type INTEGER NOT NULL,
        value INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS track (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        show_id INTEGER NOT NULL UNIQUE,
        name TEXT NOT NULL,
        episodes_watched INTEGER NOT NULL,
        latest_episode INTEGER NOT NULL,
        airing INTEGER NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )"#,
];

/// Handle to the bot's datastore. Cheap to clone.
#[derive(Clone, Debug)]
pub struct Store {
    pool: SqlitePool,
}

impl Store {
    /// Open (creating if missing) the database file and synchronize the schema.
    pub async fn open(path: &Path) -> Result<Self> {
        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(10))
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        info!(path = %path.display(), "database opened");
        Ok(store)
    }

    /// Private in-memory database (one connection, kept alive for the pool's lifetime).
    pub async fn open_in_memory() -> Result<Self> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create every table that does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        for stmt in SCHEMA {
            sqlx::query(stmt).execute(&self.pool).await?;
        }
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrate_is_repeatable_and_creates_all_tables() {
        let store = Store::open_in_memory().await.unwrap();
        store.migrate().await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(store.pool())
        .await
        .unwrap();

        assert_eq!(
            tables,
            vec![
                "channels",
                "list_entries",
                "notifications",
                "points_entries",
                "subjects",
                "track",
                "users"
            ]
        );
    }

    #[tokio::test]
    async fn file_database_persists_across_opens() {
        let path = std::env::temp_dir().join(format!("lsbot-store-{}.db", std::process::id()));
        let _ = std::fs::remove_file(&path);

        {
            let store = Store::open(&path).await.unwrap();
            store
                .find_or_create_user(crate::domain::UserId(77))
                .await
                .unwrap();
            store.pool().close().await;
        }

        let store = Store::open(&path).await.unwrap();
        let users = store.all_users().await.unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].discord_id, "77");

        store.pool().close().await;
        let _ = std::fs::remove_file(&path);
    }
}
