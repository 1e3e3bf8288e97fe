use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::domain::UserId;

/// What a list/points row is about. Only `User` is produced by the commands today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[repr(i32)]
pub enum EntryType {
    User = 0,
    Thing = 1,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, sqlx::Type)]
#[repr(i32)]
pub enum SubjectType {
    Anime = 0,
    Manga = 1,
    Nexus = 2,
    Curseforge = 3,
}

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub discord_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The platform id this row belongs to, if the stored key is well formed.
    pub fn platform_id(&self) -> Option<UserId> {
        self.discord_id.parse().ok().map(UserId)
    }
}

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct ListEntry {
    pub id: i64,
    pub entry: i64,
    pub entry_type: EntryType,
    pub time_added: DateTime<Utc>,
    pub added_by: i64,
    pub reason: Option<String>,
}

#[derive(Clone, Debug)]
pub struct NewListEntry {
    pub entry: i64,
    pub entry_type: EntryType,
    pub time_added: DateTime<Utc>,
    pub added_by: i64,
    pub reason: Option<String>,
}

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct PointsEntry {
    pub id: i64,
    pub entry: i64,
    pub entry_type: EntryType,
    pub value: i64,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct TrackedShow {
    pub id: i64,
    pub show_id: i64,
    pub name: String,
    pub episodes_watched: i64,
    pub latest_episode: i64,
    pub airing: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug)]
pub struct NewTrackedShow {
    pub show_id: i64,
    pub name: String,
    pub episodes_watched: i64,
    pub latest_episode: i64,
    pub airing: bool,
}

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct Channel {
    pub id: i64,
    pub discord_id: String,
}

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct Subject {
    pub id: i64,
    pub discord_id: String,
    pub last_updated_time: Option<DateTime<Utc>>,
    pub subject_type: SubjectType,
}

#[derive(Clone, Debug, PartialEq, FromRow)]
pub struct Notification {
    pub id: i64,
    pub channel_id: i64,
    pub subject_id: i64,
    pub user_id: i64,
    pub active: bool,
    pub progress: Option<i64>,
}
