use crate::{
    store::models::{ListEntry, NewListEntry},
    store::Store,
    Result,
};

const LIST_COLUMNS: &str = "id, entry, entry_type, time_added, added_by, reason";

impl Store {
    pub async fn insert_list_entry(&self, new: NewListEntry) -> Result<ListEntry> {
        let row = sqlx::query_as::<_, ListEntry>(&format!(
            "INSERT INTO list_entries (entry, entry_type, time_added, added_by, reason) \
             VALUES (?, ?, ?, ?, ?) RETURNING {LIST_COLUMNS}"
        ))
        .bind(new.entry)
        .bind(new.entry_type)
        .bind(new.time_added)
        .bind(new.added_by)
        .bind(new.reason)
        .fetch_one(self.pool())
        .await?;
        Ok(row)
    }

    pub async fn count_list_entries(&self, user_row_id: i64) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM list_entries WHERE entry = ?")
            .bind(user_row_id)
            .fetch_one(self.pool())
            .await?;
        Ok(count)
    }

    /// Entries about one user, oldest first.
    pub async fn list_entries_for(&self, user_row_id: i64) -> Result<Vec<ListEntry>> {
        let rows = sqlx::query_as::<_, ListEntry>(&format!(
            "SELECT {LIST_COLUMNS} FROM list_entries WHERE entry = ? ORDER BY id"
        ))
        .bind(user_row_id)
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }

    pub async fn all_list_entries(&self) -> Result<Vec<ListEntry>> {
        let rows = sqlx::query_as::<_, ListEntry>(&format!(
            "SELECT {LIST_COLUMNS} FROM list_entries ORDER BY id"
        ))
        .fetch_all(self.pool())
        .await?;
        Ok(rows)
    }
}

/// The entry with the greatest `time_added`; equal timestamps go to the later insert.
pub fn most_recent(entries: &[ListEntry]) -> Option<&ListEntry> {
    entries.iter().max_by_key(|e| (e.time_added, e.id))
}
