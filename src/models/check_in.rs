use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One submitted emotional check-in. `user_id` is NULL for anonymous
/// submissions; those never touch reward state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CheckIn {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub emotion_id: String,
    pub intensity: i16,
    pub triggers: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CheckInQuery {
    pub start_date: Option<chrono::NaiveDate>,
    pub end_date: Option<chrono::NaiveDate>,
}

/// Intensity bounds enforced on every path into a `CheckIn` row.
pub const MIN_INTENSITY: i16 = 1;
pub const MAX_INTENSITY: i16 = 5;
pub const DEFAULT_INTENSITY: i16 = 3;

/// Trigger vocabulary offered by the wizard. Custom free-text triggers are
/// allowed on top of these.
pub const COMMON_TRIGGERS: &[&str] = &[
    "Work",
    "Relationships",
    "Family",
    "Health",
    "Money",
    "Sleep",
    "Exercise",
    "Social Media",
    "Weather",
    "News",
    "Personal Growth",
    "Creativity",
];
