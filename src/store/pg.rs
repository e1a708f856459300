use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::check_in::CheckIn;
use crate::models::emotion::Emotion;
use crate::models::journal::JournalEntry;
use crate::models::profile::{level_for_xp, Profile, RewardGrant};

use super::{CheckInStore, StoreError};

/// Postgres-backed store. The streak and XP operations are read-modify-writes
/// on the profile row done inside a transaction with a row lock; they replace
/// the `update_user_streak` / `add_user_xp` procedures the hosted backend
/// used to provide.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CheckInStore for PgStore {
    async fn list_emotions(&self) -> Result<Vec<Emotion>, StoreError> {
        let emotions =
            sqlx::query_as::<_, Emotion>("SELECT * FROM emotions ORDER BY id")
                .fetch_all(&self.db)
                .await?;
        Ok(emotions)
    }

    async fn create_check_in(
        &self,
        user_id: Option<Uuid>,
        emotion_id: &str,
        intensity: i16,
        triggers: &[String],
    ) -> Result<CheckIn, StoreError> {
        let check_in = sqlx::query_as::<_, CheckIn>(
            r#"
            INSERT INTO check_ins (id, user_id, emotion_id, intensity, triggers)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(emotion_id)
        .bind(intensity)
        .bind(triggers)
        .fetch_one(&self.db)
        .await?;

        Ok(check_in)
    }

    async fn update_streak(&self, user_id: Uuid) -> Result<i32, StoreError> {
        let mut tx = self.db.begin().await?;

        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let today = Utc::now().date_naive();
        let streak_days = match profile.last_check_in_date {
            // Repeat check-in on the same day leaves the streak unchanged.
            Some(last) if last == today => profile.streak_days,
            Some(last) if last == today - chrono::Duration::days(1) => profile.streak_days + 1,
            // Gap of more than a day (or first ever check-in) resets to 1.
            _ => 1,
        };

        sqlx::query(
            r#"
            UPDATE profiles SET
                streak_days = $2,
                last_check_in_date = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(streak_days)
        .bind(today)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(streak_days)
    }

    async fn grant_xp(&self, user_id: Uuid, amount: i32) -> Result<RewardGrant, StoreError> {
        let mut tx = self.db.begin().await?;

        let profile = sqlx::query_as::<_, Profile>(
            "SELECT * FROM profiles WHERE id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let total_xp = profile.total_xp + amount;
        let current_level = level_for_xp(total_xp);
        let level_up = current_level > profile.current_level;

        sqlx::query(
            r#"
            UPDATE profiles SET
                total_xp = $2,
                current_level = $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(total_xp)
        .bind(current_level)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(RewardGrant {
            total_xp,
            current_level,
            level_up,
        })
    }

    async fn create_journal_entry(
        &self,
        user_id: Uuid,
        emotion_id: &str,
        title: Option<&str>,
        content: &str,
        check_in_id: Option<Uuid>,
    ) -> Result<JournalEntry, StoreError> {
        let entry = sqlx::query_as::<_, JournalEntry>(
            r#"
            INSERT INTO journal_entries (id, user_id, emotion_id, title, content, check_in_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(emotion_id)
        .bind(title)
        .bind(content)
        .bind(check_in_id)
        .fetch_one(&self.db)
        .await?;

        Ok(entry)
    }
}
