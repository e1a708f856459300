use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::auth::jwt::verify_token;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

/// Identity attached by `optional_auth`: the check-in wizard accepts both
/// signed-in and anonymous callers, and the difference decides whether
/// rewards exist at all.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<AuthUser>);

pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_user = user_from_header(&state, &req)?.ok_or(AppError::Unauthorized)?;
    req.extensions_mut().insert(auth_user);
    Ok(next.run(req).await)
}

/// Like `require_auth` but a missing Authorization header means anonymous
/// rather than 401. A header that is present but invalid is still rejected;
/// silently downgrading a bad token to anonymous would hide expiry from the
/// client.
pub async fn optional_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let maybe = MaybeUser(user_from_header(&state, &req)?);
    req.extensions_mut().insert(maybe);
    Ok(next.run(req).await)
}

fn user_from_header(state: &AppState, req: &Request) -> Result<Option<AuthUser>, AppError> {
    let Some(auth_header) = req.headers().get(AUTHORIZATION) else {
        return Ok(None);
    };

    let token = auth_header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let token_data = verify_token(token, &state.config)?;

    Ok(Some(AuthUser {
        id: token_data.claims.sub,
    }))
}
