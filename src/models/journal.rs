use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A journal entry written during the check-in wizard. `check_in_id` links it
/// to the check-in created in the same flow run.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub emotion_id: String,
    pub title: Option<String>,
    pub content: String,
    pub check_in_id: Option<Uuid>,
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
}
