//! The check-in capture flow.
//!
//! A linear, cancellable wizard: emotion → intensity → triggers → optional
//! journal → complete. Steps before the trigger confirmation are pure
//! selection; confirming triggers performs the one required write (the
//! check-in row) and, for signed-in users, kicks off the best-effort reward
//! bookkeeping. The journal step may add one more write and one more grant.
//!
//! The flow owns all sequencing rules: which events are legal in which step,
//! what blocks and what is merely logged, and the XP/level-up accounting
//! shown on the completion screen. Handlers translate HTTP events into the
//! methods below and never touch the ordering themselves.

mod registry;

pub use registry::{spawn_flow_sweeper, FlowRegistry, FlowSession};

use serde::Serialize;
use uuid::Uuid;

use crate::models::check_in::{CheckIn, DEFAULT_INTENSITY, MAX_INTENSITY, MIN_INTENSITY};
use crate::models::emotion::Emotion;
use crate::models::journal::JournalEntry;
use crate::store::{CheckInStore, StoreError};

/// XP granted for completing a check-in (signed-in users only).
pub const CHECK_IN_XP: i32 = 10;
/// Additional XP granted for attaching a journal entry.
pub const JOURNAL_XP: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    EmotionSelection,
    IntensitySelection,
    TriggerSelection,
    JournalPrompt,
    Complete,
}

impl FlowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStep::EmotionSelection => "emotion_selection",
            FlowStep::IntensitySelection => "intensity_selection",
            FlowStep::TriggerSelection => "trigger_selection",
            FlowStep::JournalPrompt => "journal_prompt",
            FlowStep::Complete => "complete",
        }
    }
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    #[error("{event} is not valid in step {step}")]
    InvalidTransition { step: FlowStep, event: &'static str },

    #[error("unknown emotion: {0}")]
    UnknownEmotion(String),

    #[error("journal content must not be empty")]
    EmptyJournal,

    #[error("journal entries require a signed-in session")]
    AnonymousJournal,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// One wizard instance. Created per run, driven by events, discarded after
/// `complete` (or cancelled). All selections live here until the check-in
/// write; nothing is committed earlier, so abandoning a flow costs nothing.
#[derive(Debug)]
pub struct CheckInFlow {
    user_id: Option<Uuid>,
    emotions: Vec<Emotion>,
    step: FlowStep,
    emotion: Option<Emotion>,
    intensity: i16,
    triggers: Vec<String>,
    check_in_id: Option<Uuid>,
    journal_entry_id: Option<Uuid>,
    earned_xp: i32,
    level_up: bool,
}

/// Serializable view of a flow, returned from every flow endpoint.
#[derive(Debug, Serialize)]
pub struct FlowSnapshot {
    pub step: FlowStep,
    pub emotion: Option<Emotion>,
    pub intensity: i16,
    pub triggers: Vec<String>,
    pub check_in_id: Option<Uuid>,
    pub journal_entry_id: Option<Uuid>,
    pub earned_xp: i32,
    pub level_up: bool,
}

impl CheckInFlow {
    /// Start a flow for the given identity with a session snapshot of the
    /// emotion reference list.
    pub fn new(user_id: Option<Uuid>, emotions: Vec<Emotion>) -> Self {
        Self {
            user_id,
            emotions,
            step: FlowStep::EmotionSelection,
            emotion: None,
            intensity: DEFAULT_INTENSITY,
            triggers: Vec::new(),
            check_in_id: None,
            journal_entry_id: None,
            earned_xp: 0,
            level_up: false,
        }
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot {
            step: self.step,
            emotion: self.emotion.clone(),
            intensity: self.intensity,
            triggers: self.triggers.clone(),
            check_in_id: self.check_in_id,
            journal_entry_id: self.journal_entry_id,
            earned_xp: self.earned_xp,
            level_up: self.level_up,
        }
    }

    /// emotion_selection → intensity_selection. The emotion must come from
    /// the list this flow was started with.
    pub fn select_emotion(&mut self, emotion_id: &str) -> Result<(), FlowError> {
        if self.step != FlowStep::EmotionSelection {
            return Err(self.invalid("select_emotion"));
        }
        let emotion = self
            .emotions
            .iter()
            .find(|e| e.id == emotion_id)
            .cloned()
            .ok_or_else(|| FlowError::UnknownEmotion(emotion_id.to_string()))?;
        self.emotion = Some(emotion);
        self.step = FlowStep::IntensitySelection;
        Ok(())
    }

    /// intensity_selection → trigger_selection. Values outside [1,5] clamp;
    /// the slider UI cannot produce them, other clients might.
    pub fn confirm_intensity(&mut self, intensity: i16) -> Result<(), FlowError> {
        if self.step != FlowStep::IntensitySelection {
            return Err(self.invalid("confirm_intensity"));
        }
        self.intensity = intensity.clamp(MIN_INTENSITY, MAX_INTENSITY);
        self.step = FlowStep::TriggerSelection;
        Ok(())
    }

    /// Add the trigger if absent, remove it if present. Only legal while on
    /// the trigger step.
    pub fn toggle_trigger(&mut self, trigger: &str) -> Result<(), FlowError> {
        if self.step != FlowStep::TriggerSelection {
            return Err(self.invalid("toggle_trigger"));
        }
        if let Some(pos) = self.triggers.iter().position(|t| t == trigger) {
            self.triggers.remove(pos);
        } else {
            self.triggers.push(trigger.to_string());
        }
        Ok(())
    }

    /// Add a free-text trigger. Whitespace is trimmed; empty and duplicate
    /// entries are silently ignored, matching the wizard UI.
    pub fn add_custom_trigger(&mut self, raw: &str) -> Result<(), FlowError> {
        if self.step != FlowStep::TriggerSelection {
            return Err(self.invalid("add_custom_trigger"));
        }
        let trigger = raw.trim();
        if !trigger.is_empty() && !self.triggers.iter().any(|t| t == trigger) {
            self.triggers.push(trigger.to_string());
        }
        Ok(())
    }

    /// trigger_selection → journal_prompt. Persists the check-in; this is the
    /// first required side effect and the transition does not happen unless
    /// the write succeeds. For signed-in users the write is followed by the
    /// streak update and the +10 XP grant; both are best-effort and their
    /// failures are logged, never surfaced, and never block.
    ///
    /// Once a flow's check-in is written the step advances, so a repeated
    /// confirm on the same flow is an invalid transition rather than a second
    /// row.
    pub async fn confirm_triggers<S: CheckInStore + ?Sized>(
        &mut self,
        store: &S,
    ) -> Result<CheckIn, FlowError> {
        if self.step != FlowStep::TriggerSelection {
            return Err(self.invalid("confirm_triggers"));
        }
        let Some(emotion) = self.emotion.clone() else {
            return Err(self.invalid("confirm_triggers"));
        };

        // Blocking write: on failure the flow stays here with every
        // selection intact and the caller decides whether to retry.
        let check_in = store
            .create_check_in(self.user_id, &emotion.id, self.intensity, &self.triggers)
            .await?;
        self.check_in_id = Some(check_in.id);

        if let Some(user_id) = self.user_id {
            if let Err(e) = store.update_streak(user_id).await {
                tracing::error!(user_id = %user_id, error = %e, "Failed to update streak");
            }
            match store.grant_xp(user_id, CHECK_IN_XP).await {
                Ok(grant) => self.level_up = grant.level_up,
                Err(e) => {
                    tracing::error!(user_id = %user_id, error = %e, "Failed to grant check-in XP");
                }
            }
            // The completion screen credits the check-in XP whenever the
            // check-in row exists, whether or not the grant landed.
            self.earned_xp = CHECK_IN_XP;
        }

        self.step = FlowStep::JournalPrompt;
        Ok(check_in)
    }

    /// journal_prompt → complete via "save". Requires a signed-in session and
    /// non-empty content; otherwise only the skip path applies. A failed
    /// entry write still completes the flow, with only the check-in XP
    /// credited.
    pub async fn save_journal<S: CheckInStore + ?Sized>(
        &mut self,
        store: &S,
        title: Option<String>,
        content: &str,
    ) -> Result<JournalEntry, FlowError> {
        if self.step != FlowStep::JournalPrompt {
            return Err(self.invalid("save_journal"));
        }
        let Some(user_id) = self.user_id else {
            return Err(FlowError::AnonymousJournal);
        };
        if content.trim().is_empty() {
            return Err(FlowError::EmptyJournal);
        }
        let Some(emotion) = self.emotion.clone() else {
            return Err(self.invalid("save_journal"));
        };

        let title = title.unwrap_or_else(|| {
            format!("{} - {}", emotion.name, chrono::Utc::now().format("%Y-%m-%d"))
        });

        let entry = match store
            .create_journal_entry(user_id, &emotion.id, Some(&title), content, self.check_in_id)
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                // Degrade gracefully: the run completes on check-in XP alone.
                self.step = FlowStep::Complete;
                return Err(e.into());
            }
        };
        self.journal_entry_id = Some(entry.id);
        self.earned_xp += JOURNAL_XP;

        if let Err(e) = store.grant_xp(user_id, JOURNAL_XP).await {
            tracing::error!(user_id = %user_id, error = %e, "Failed to grant journal XP");
        }

        self.step = FlowStep::Complete;
        Ok(entry)
    }

    /// journal_prompt → complete via "skip". Always available, no writes.
    pub fn skip_journal(&mut self) -> Result<(), FlowError> {
        if self.step != FlowStep::JournalPrompt {
            return Err(self.invalid("skip_journal"));
        }
        self.step = FlowStep::Complete;
        Ok(())
    }

    /// Back-navigation to the previous selection step. Never allowed once the
    /// check-in has been written.
    pub fn back(&mut self) -> Result<(), FlowError> {
        match self.step {
            FlowStep::IntensitySelection => {
                self.step = FlowStep::EmotionSelection;
                Ok(())
            }
            FlowStep::TriggerSelection => {
                self.step = FlowStep::IntensitySelection;
                Ok(())
            }
            _ => Err(self.invalid("back")),
        }
    }

    fn invalid(&self, event: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            step: self.step,
            event,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::profile::{level_for_xp, Profile, RewardGrant};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    /// In-memory stand-in for the Postgres store. Records every call so the
    /// tests can assert on exactly which writes and reward calls happened,
    /// and can be told to fail any single operation.
    #[derive(Default)]
    struct MemoryStore {
        emotions: Vec<Emotion>,
        profiles: Mutex<HashMap<Uuid, Profile>>,
        check_ins: Mutex<Vec<CheckIn>>,
        journal_entries: Mutex<Vec<JournalEntry>>,
        streak_calls: Mutex<Vec<Uuid>>,
        xp_grants: Mutex<Vec<(Uuid, i32)>>,
        fail_check_ins: AtomicBool,
        fail_journal: AtomicBool,
        fail_streak: AtomicBool,
        fail_xp: AtomicBool,
    }

    fn persistence_error() -> StoreError {
        StoreError::Persistence(sqlx::Error::PoolClosed)
    }

    fn emotion(id: &str, name: &str) -> Emotion {
        Emotion {
            id: id.to_string(),
            name: name.to_string(),
            emoji: "🙂".to_string(),
            color_primary: "#F59E0B".to_string(),
            color_secondary: "#FDE68A".to_string(),
        }
    }

    impl MemoryStore {
        fn new() -> Self {
            Self {
                emotions: vec![emotion("joy", "Joy"), emotion("sadness", "Sadness")],
                ..Default::default()
            }
        }

        fn with_profile(self, user_id: Uuid, total_xp: i32) -> Self {
            let now = Utc::now();
            self.profiles.lock().unwrap().insert(
                user_id,
                Profile {
                    id: user_id,
                    display_name: "test".to_string(),
                    total_xp,
                    current_level: level_for_xp(total_xp),
                    streak_days: 0,
                    last_check_in_date: None,
                    created_at: now,
                    updated_at: now,
                },
            );
            self
        }

        fn check_in_count(&self) -> usize {
            self.check_ins.lock().unwrap().len()
        }

        fn journal_count(&self) -> usize {
            self.journal_entries.lock().unwrap().len()
        }

        fn reward_call_count(&self) -> usize {
            self.streak_calls.lock().unwrap().len() + self.xp_grants.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl CheckInStore for MemoryStore {
        async fn list_emotions(&self) -> Result<Vec<Emotion>, StoreError> {
            Ok(self.emotions.clone())
        }

        async fn create_check_in(
            &self,
            user_id: Option<Uuid>,
            emotion_id: &str,
            intensity: i16,
            triggers: &[String],
        ) -> Result<CheckIn, StoreError> {
            if self.fail_check_ins.load(Ordering::SeqCst) {
                return Err(persistence_error());
            }
            let check_in = CheckIn {
                id: Uuid::new_v4(),
                user_id,
                emotion_id: emotion_id.to_string(),
                intensity,
                triggers: triggers.to_vec(),
                created_at: Utc::now(),
            };
            self.check_ins.lock().unwrap().push(check_in.clone());
            Ok(check_in)
        }

        async fn update_streak(&self, user_id: Uuid) -> Result<i32, StoreError> {
            self.streak_calls.lock().unwrap().push(user_id);
            if self.fail_streak.load(Ordering::SeqCst) {
                return Err(persistence_error());
            }
            let mut profiles = self.profiles.lock().unwrap();
            let profile = profiles.get_mut(&user_id).ok_or_else(persistence_error)?;
            profile.streak_days += 1;
            profile.last_check_in_date = Some(Utc::now().date_naive());
            Ok(profile.streak_days)
        }

        async fn grant_xp(&self, user_id: Uuid, amount: i32) -> Result<RewardGrant, StoreError> {
            self.xp_grants.lock().unwrap().push((user_id, amount));
            if self.fail_xp.load(Ordering::SeqCst) {
                return Err(persistence_error());
            }
            let mut profiles = self.profiles.lock().unwrap();
            let profile = profiles.get_mut(&user_id).ok_or_else(persistence_error)?;
            profile.total_xp += amount;
            let new_level = level_for_xp(profile.total_xp);
            let level_up = new_level > profile.current_level;
            profile.current_level = new_level;
            Ok(RewardGrant {
                total_xp: profile.total_xp,
                current_level: new_level,
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
            if self.fail_journal.load(Ordering::SeqCst) {
                return Err(persistence_error());
            }
            let entry = JournalEntry {
                id: Uuid::new_v4(),
                user_id,
                emotion_id: emotion_id.to_string(),
                title: title.map(str::to_string),
                content: content.to_string(),
                check_in_id,
                is_favorite: false,
                created_at: Utc::now(),
            };
            self.journal_entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        }
    }

    async fn flow_at_triggers(store: &MemoryStore, user_id: Option<Uuid>) -> CheckInFlow {
        let mut flow = CheckInFlow::new(user_id, store.list_emotions().await.unwrap());
        flow.select_emotion("joy").unwrap();
        flow.confirm_intensity(4).unwrap();
        flow.toggle_trigger("Work").unwrap();
        flow
    }

    #[tokio::test]
    async fn authenticated_flow_with_journal_earns_thirty_xp() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new().with_profile(user_id, 0);
        let mut flow = flow_at_triggers(&store, Some(user_id)).await;

        let check_in = flow.confirm_triggers(&store).await.unwrap();
        assert_eq!(flow.step(), FlowStep::JournalPrompt);
        assert_eq!(check_in.user_id, Some(user_id));
        assert_eq!(check_in.emotion_id, "joy");
        assert_eq!(check_in.intensity, 4);
        assert_eq!(check_in.triggers, vec!["Work".to_string()]);

        let entry = flow
            .save_journal(&store, None, "Tough day")
            .await
            .unwrap();
        assert_eq!(flow.step(), FlowStep::Complete);
        assert_eq!(entry.check_in_id, Some(check_in.id));
        assert_eq!(entry.content, "Tough day");
        // Default title carries the emotion name.
        assert!(entry.title.unwrap().starts_with("Joy - "));

        let snapshot = flow.snapshot();
        assert_eq!(snapshot.earned_xp, 30);
        assert_eq!(store.check_in_count(), 1);
        assert_eq!(store.journal_count(), 1);
        assert_eq!(
            *store.xp_grants.lock().unwrap(),
            vec![(user_id, CHECK_IN_XP), (user_id, JOURNAL_XP)]
        );
        assert_eq!(*store.streak_calls.lock().unwrap(), vec![user_id]);
    }

    #[tokio::test]
    async fn anonymous_flow_never_touches_rewards_or_journal() {
        let store = MemoryStore::new();
        let mut flow = flow_at_triggers(&store, None).await;

        let check_in = flow.confirm_triggers(&store).await.unwrap();
        assert_eq!(check_in.user_id, None);
        assert_eq!(store.reward_call_count(), 0);

        // Journal save is unavailable regardless of content.
        let err = flow
            .save_journal(&store, None, "still want to write")
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::AnonymousJournal));
        assert_eq!(store.journal_count(), 0);

        flow.skip_journal().unwrap();
        let snapshot = flow.snapshot();
        assert_eq!(snapshot.step, FlowStep::Complete);
        assert_eq!(snapshot.earned_xp, 0);
        assert!(!snapshot.level_up);
        assert_eq!(store.reward_call_count(), 0);
    }

    #[tokio::test]
    async fn intensity_clamps_to_valid_range() {
        let store = MemoryStore::new();
        let mut flow = CheckInFlow::new(None, store.list_emotions().await.unwrap());
        assert_eq!(flow.snapshot().intensity, 3);

        flow.select_emotion("joy").unwrap();
        flow.confirm_intensity(9).unwrap();
        assert_eq!(flow.snapshot().intensity, 5);

        flow.back().unwrap();
        flow.confirm_intensity(-2).unwrap();
        assert_eq!(flow.snapshot().intensity, 1);

        flow.confirm_triggers(&store).await.unwrap();
        assert_eq!(store.check_ins.lock().unwrap()[0].intensity, 1);
    }

    #[tokio::test]
    async fn check_in_failure_keeps_selections_and_allows_retry() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new().with_profile(user_id, 0);
        let mut flow = flow_at_triggers(&store, Some(user_id)).await;

        store.fail_check_ins.store(true, Ordering::SeqCst);
        let err = flow.confirm_triggers(&store).await.unwrap_err();
        assert!(matches!(err, FlowError::Store(_)));

        let snapshot = flow.snapshot();
        assert_eq!(snapshot.step, FlowStep::TriggerSelection);
        assert_eq!(snapshot.emotion.unwrap().id, "joy");
        assert_eq!(snapshot.intensity, 4);
        assert_eq!(snapshot.triggers, vec!["Work".to_string()]);
        assert_eq!(store.check_in_count(), 0);
        // No reward call happens before the check-in write succeeds.
        assert_eq!(store.reward_call_count(), 0);

        store.fail_check_ins.store(false, Ordering::SeqCst);
        flow.confirm_triggers(&store).await.unwrap();
        assert_eq!(flow.step(), FlowStep::JournalPrompt);
        assert_eq!(store.check_in_count(), 1);
    }

    #[tokio::test]
    async fn journal_failure_still_completes_with_check_in_xp_only() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new().with_profile(user_id, 0);
        let mut flow = flow_at_triggers(&store, Some(user_id)).await;
        flow.confirm_triggers(&store).await.unwrap();

        store.fail_journal.store(true, Ordering::SeqCst);
        let err = flow
            .save_journal(&store, None, "Tough day")
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::Store(_)));

        let snapshot = flow.snapshot();
        assert_eq!(snapshot.step, FlowStep::Complete);
        assert_eq!(snapshot.earned_xp, CHECK_IN_XP);
        assert_eq!(snapshot.journal_entry_id, None);
        // No journal XP grant is even attempted.
        assert_eq!(*store.xp_grants.lock().unwrap(), vec![(user_id, CHECK_IN_XP)]);
    }

    #[tokio::test]
    async fn reward_failures_never_block_the_wizard() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new().with_profile(user_id, 0);
        store.fail_streak.store(true, Ordering::SeqCst);
        store.fail_xp.store(true, Ordering::SeqCst);

        let mut flow = flow_at_triggers(&store, Some(user_id)).await;
        flow.confirm_triggers(&store).await.unwrap();

        let snapshot = flow.snapshot();
        assert_eq!(snapshot.step, FlowStep::JournalPrompt);
        // The completion screen still shows the check-in XP; level-up stays
        // false because no grant response reported one.
        assert_eq!(snapshot.earned_xp, CHECK_IN_XP);
        assert!(!snapshot.level_up);
    }

    #[tokio::test]
    async fn level_up_flag_comes_from_the_grant_response() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new().with_profile(user_id, 95);
        let mut flow = flow_at_triggers(&store, Some(user_id)).await;

        flow.confirm_triggers(&store).await.unwrap();
        assert!(flow.snapshot().level_up, "95 + 10 XP crosses level 2");
    }

    #[tokio::test]
    async fn double_submit_is_rejected_after_the_first_write() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new().with_profile(user_id, 0);
        let mut flow = flow_at_triggers(&store, Some(user_id)).await;

        flow.confirm_triggers(&store).await.unwrap();
        let err = flow.confirm_triggers(&store).await.unwrap_err();
        assert!(matches!(err, FlowError::InvalidTransition { .. }));
        assert_eq!(store.check_in_count(), 1);
    }

    #[tokio::test]
    async fn identical_runs_produce_distinct_check_ins() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new().with_profile(user_id, 0);

        for _ in 0..2 {
            let mut flow = flow_at_triggers(&store, Some(user_id)).await;
            flow.confirm_triggers(&store).await.unwrap();
            flow.skip_journal().unwrap();
        }

        let check_ins = store.check_ins.lock().unwrap();
        assert_eq!(check_ins.len(), 2);
        assert_ne!(check_ins[0].id, check_ins[1].id);
    }

    #[tokio::test]
    async fn empty_journal_content_is_rejected_without_a_write() {
        let user_id = Uuid::new_v4();
        let store = MemoryStore::new().with_profile(user_id, 0);
        let mut flow = flow_at_triggers(&store, Some(user_id)).await;
        flow.confirm_triggers(&store).await.unwrap();

        let err = flow.save_journal(&store, None, "   ").await.unwrap_err();
        assert!(matches!(err, FlowError::EmptyJournal));
        assert_eq!(flow.step(), FlowStep::JournalPrompt);
        assert_eq!(store.journal_count(), 0);
    }

    #[tokio::test]
    async fn unknown_emotion_is_rejected() {
        let store = MemoryStore::new();
        let mut flow = CheckInFlow::new(None, store.list_emotions().await.unwrap());
        let err = flow.select_emotion("serenity").unwrap_err();
        assert!(matches!(err, FlowError::UnknownEmotion(_)));
        assert_eq!(flow.step(), FlowStep::EmotionSelection);
    }

    #[tokio::test]
    async fn back_navigation_only_reaches_prior_selection_steps() {
        let store = MemoryStore::new();
        let mut flow = CheckInFlow::new(None, store.list_emotions().await.unwrap());

        assert!(flow.back().is_err());

        flow.select_emotion("joy").unwrap();
        flow.back().unwrap();
        assert_eq!(flow.step(), FlowStep::EmotionSelection);

        flow.select_emotion("sadness").unwrap();
        flow.confirm_intensity(2).unwrap();
        flow.back().unwrap();
        assert_eq!(flow.step(), FlowStep::IntensitySelection);

        flow.confirm_intensity(2).unwrap();
        flow.confirm_triggers(&store).await.unwrap();
        // Once the check-in is written there is no way back.
        assert!(flow.back().is_err());
        flow.skip_journal().unwrap();
        assert!(flow.back().is_err());
    }

    #[tokio::test]
    async fn triggers_toggle_and_dedupe() {
        let store = MemoryStore::new();
        let mut flow = CheckInFlow::new(None, store.list_emotions().await.unwrap());
        flow.select_emotion("joy").unwrap();
        flow.confirm_intensity(3).unwrap();

        flow.toggle_trigger("Work").unwrap();
        flow.toggle_trigger("Sleep").unwrap();
        flow.toggle_trigger("Work").unwrap();
        assert_eq!(flow.snapshot().triggers, vec!["Sleep".to_string()]);

        flow.add_custom_trigger("  deadlines  ").unwrap();
        flow.add_custom_trigger("deadlines").unwrap();
        flow.add_custom_trigger("   ").unwrap();
        assert_eq!(
            flow.snapshot().triggers,
            vec!["Sleep".to_string(), "deadlines".to_string()]
        );
    }

    #[tokio::test]
    async fn events_outside_their_step_are_conflicts() {
        let store = MemoryStore::new();
        let mut flow = CheckInFlow::new(None, store.list_emotions().await.unwrap());

        assert!(flow.confirm_intensity(3).is_err());
        assert!(flow.toggle_trigger("Work").is_err());
        assert!(flow.confirm_triggers(&store).await.is_err());
        assert!(flow.skip_journal().is_err());
        assert_eq!(store.check_in_count(), 0);

        flow.select_emotion("joy").unwrap();
        assert!(flow.select_emotion("joy").is_err());
    }
}
