//! The backend data service behind the check-in wizard.
//!
//! `CheckInStore` is the seam between the flow state machine and persistence:
//! production uses [`PgStore`], tests drive the flow against an in-memory
//! double. Every operation either succeeds or fails with a single
//! `Persistence` error class; the flow decides which failures block and which
//! are logged and swallowed.

mod pg;

pub use pg::PgStore;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::check_in::CheckIn;
use crate::models::emotion::Emotion;
use crate::models::journal::JournalEntry;
use crate::models::profile::RewardGrant;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("persistence failure: {0}")]
    Persistence(#[from] sqlx::Error),
}

#[async_trait]
pub trait CheckInStore: Send + Sync {
    /// Emotion reference list. Small and immutable; flows snapshot it once.
    async fn list_emotions(&self) -> Result<Vec<Emotion>, StoreError>;

    /// Persist one check-in. `user_id` is None for anonymous submissions.
    async fn create_check_in(
        &self,
        user_id: Option<Uuid>,
        emotion_id: &str,
        intensity: i16,
        triggers: &[String],
    ) -> Result<CheckIn, StoreError>;

    /// Roll the user's daily streak forward for today. Returns the new
    /// streak length.
    async fn update_streak(&self, user_id: Uuid) -> Result<i32, StoreError>;

    /// Add XP and recompute the level. `level_up` in the result is true iff
    /// this grant crossed a level boundary.
    async fn grant_xp(&self, user_id: Uuid, amount: i32) -> Result<RewardGrant, StoreError>;

    /// Persist a journal entry, optionally linked to a check-in.
    async fn create_journal_entry(
        &self,
        user_id: Uuid,
        emotion_id: &str,
        title: Option<&str>,
        content: &str,
        check_in_id: Option<Uuid>,
    ) -> Result<JournalEntry, StoreError>;
}
