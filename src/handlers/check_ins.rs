use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::models::check_in::{CheckIn, CheckInQuery};
use crate::AppState;

/// Check-in history for the signed-in user, newest first. This is the view
/// the completion screen and analytics refetch after a flow finishes.
pub async fn list_check_ins(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<CheckInQuery>,
) -> AppResult<Json<Vec<CheckIn>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let check_ins = sqlx::query_as::<_, CheckIn>(
        r#"
        SELECT * FROM check_ins
        WHERE user_id = $1 AND created_at::date BETWEEN $2 AND $3
        ORDER BY created_at DESC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(check_ins))
}
