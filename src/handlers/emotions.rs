use axum::{extract::State, Json};

use crate::error::AppResult;
use crate::models::emotion::Emotion;
use crate::AppState;

/// Public emotion reference list. Seeded by migration, ordered by id the way
/// the wizard grid displays it.
pub async fn list_emotions(State(state): State<AppState>) -> AppResult<Json<Vec<Emotion>>> {
    let emotions = sqlx::query_as::<_, Emotion>("SELECT * FROM emotions ORDER BY id")
        .fetch_all(&state.db)
        .await?;

    Ok(Json(emotions))
}
