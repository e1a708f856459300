use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-user reward state. Mutated only by the reward procedures in the store;
/// the wizard reads the level-up flag those return and nothing else.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub display_name: String,
    pub total_xp: i32,
    pub current_level: i32,
    pub streak_days: i32,
    pub last_check_in_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outcome of an XP grant. `level_up` is true iff this grant crossed a level
/// boundary; clients never recompute it.
#[derive(Debug, Clone, Serialize)]
pub struct RewardGrant {
    pub total_xp: i32,
    pub current_level: i32,
    pub level_up: bool,
}

/// Level is a deterministic function of cumulative XP: one level per 100 XP,
/// starting at level 1.
pub fn level_for_xp(total_xp: i32) -> i32 {
    total_xp / 100 + 1
}
