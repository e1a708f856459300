use axum::{
    extract::{Path, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::middleware::{AuthUser, MaybeUser};
use crate::error::{AppError, AppResult};
use crate::flow::{CheckInFlow, FlowSnapshot};
use crate::models::check_in::COMMON_TRIGGERS;
use crate::models::emotion::Emotion;
use crate::store::CheckInStore;
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct JournalPayload {
    #[validate(length(max = 200, message = "Title must be under 200 characters"))]
    pub title: Option<String>,

    #[validate(length(min = 1, max = 5000, message = "Content must be 1-5000 characters"))]
    pub content: String,
}

/// Wizard events, one per legal transition. The flow itself decides whether
/// an event is valid in the current step.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlowEventRequest {
    SelectEmotion { emotion_id: String },
    ConfirmIntensity { intensity: i16 },
    ToggleTrigger { trigger: String },
    AddCustomTrigger { trigger: String },
    ConfirmTriggers,
    SaveJournal(JournalPayload),
    SkipJournal,
    Back,
}

#[derive(Debug, Serialize)]
pub struct StartFlowResponse {
    pub flow_id: Uuid,
    pub flow: FlowSnapshot,
    /// Emotion reference list, snapshotted into the flow session; clients
    /// cache it for the wizard's lifetime.
    pub emotions: Vec<Emotion>,
    /// Suggested trigger chips for the trigger step.
    pub common_triggers: &'static [&'static str],
}

#[derive(Debug, Serialize)]
pub struct FlowResponse {
    pub flow_id: Uuid,
    pub flow: FlowSnapshot,
}

pub async fn start_flow(
    State(state): State<AppState>,
    Extension(MaybeUser(user)): Extension<MaybeUser>,
) -> AppResult<Json<StartFlowResponse>> {
    let emotions = state.store.list_emotions().await?;
    let flow = CheckInFlow::new(user.map(|u| u.id), emotions.clone());
    let snapshot = flow.snapshot();
    let flow_id = state.flows.create(flow).await;

    tracing::debug!(flow_id = %flow_id, anonymous = user.is_none(), "Check-in flow started");

    Ok(Json(StartFlowResponse {
        flow_id,
        flow: snapshot,
        emotions,
        common_triggers: COMMON_TRIGGERS,
    }))
}

pub async fn get_flow(
    State(state): State<AppState>,
    Extension(MaybeUser(user)): Extension<MaybeUser>,
    Path(flow_id): Path<Uuid>,
) -> AppResult<Json<FlowResponse>> {
    let session = state
        .flows
        .get(flow_id)
        .await
        .ok_or_else(flow_not_found)?;
    let session = session.lock().await;
    verify_owner(&session.flow, user)?;

    Ok(Json(FlowResponse {
        flow_id,
        flow: session.flow.snapshot(),
    }))
}

pub async fn apply_event(
    State(state): State<AppState>,
    Extension(MaybeUser(user)): Extension<MaybeUser>,
    Path(flow_id): Path<Uuid>,
    Json(event): Json<FlowEventRequest>,
) -> AppResult<Json<FlowResponse>> {
    let session = state
        .flows
        .get(flow_id)
        .await
        .ok_or_else(flow_not_found)?;

    // The session lock is held for the whole event, including the check-in
    // write, so events on one flow apply strictly one at a time.
    let mut session = session.lock().await;
    verify_owner(&session.flow, user)?;
    session.touch();

    match event {
        FlowEventRequest::SelectEmotion { emotion_id } => {
            session.flow.select_emotion(&emotion_id)?;
        }
        FlowEventRequest::ConfirmIntensity { intensity } => {
            session.flow.confirm_intensity(intensity)?;
        }
        FlowEventRequest::ToggleTrigger { trigger } => {
            session.flow.toggle_trigger(&trigger)?;
        }
        FlowEventRequest::AddCustomTrigger { trigger } => {
            session.flow.add_custom_trigger(&trigger)?;
        }
        FlowEventRequest::ConfirmTriggers => {
            let check_in = session.flow.confirm_triggers(&state.store).await?;
            if let (Some(user), Some(tx)) = (user, state.ws_tx.as_ref()) {
                let msg = serde_json::json!({
                    "type": "check_in_recorded",
                    "user_id": user.id,
                    "check_in_id": check_in.id,
                });
                let _ = tx.send(msg.to_string());
            }
        }
        FlowEventRequest::SaveJournal(payload) => {
            payload
                .validate()
                .map_err(|e| AppError::Validation(e.to_string()))?;
            let entry = session
                .flow
                .save_journal(&state.store, payload.title, &payload.content)
                .await?;
            if let (Some(user), Some(tx)) = (user, state.ws_tx.as_ref()) {
                let msg = serde_json::json!({
                    "type": "journal_saved",
                    "user_id": user.id,
                    "journal_entry_id": entry.id,
                });
                let _ = tx.send(msg.to_string());
            }
        }
        FlowEventRequest::SkipJournal => {
            session.flow.skip_journal()?;
        }
        FlowEventRequest::Back => {
            session.flow.back()?;
        }
    }

    tracing::debug!(flow_id = %flow_id, step = %session.flow.step(), "Flow event applied");

    Ok(Json(FlowResponse {
        flow_id,
        flow: session.flow.snapshot(),
    }))
}

pub async fn cancel_flow(
    State(state): State<AppState>,
    Extension(MaybeUser(user)): Extension<MaybeUser>,
    Path(flow_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let session = state
        .flows
        .get(flow_id)
        .await
        .ok_or_else(flow_not_found)?;
    {
        let session = session.lock().await;
        verify_owner(&session.flow, user)?;
    }
    state.flows.remove(flow_id).await;

    Ok(Json(serde_json::json!({ "cancelled": true })))
}

/// Flows are bound at creation to the caller's identity; any other identity
/// (including anonymous vs signed-in mismatches) sees 404 rather than 403 so
/// flow ids leak nothing.
fn verify_owner(flow: &CheckInFlow, user: Option<AuthUser>) -> AppResult<()> {
    if flow.user_id() != user.map(|u| u.id) {
        return Err(flow_not_found());
    }
    Ok(())
}

fn flow_not_found() -> AppError {
    AppError::NotFound("Check-in flow not found".into())
}
