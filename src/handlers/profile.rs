use axum::{extract::State, Extension, Json};

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::profile::Profile;
use crate::AppState;

/// Reward state for the signed-in user: XP, level, streak. Mutated only by
/// the reward procedures; this endpoint is how the completion screen shows
/// updated counters.
pub async fn me(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<Profile>> {
    let profile = sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("Profile not found".into()))?;

    Ok(Json(profile))
}
