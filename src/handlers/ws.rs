use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::jwt::verify_token;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// Change feed for dependent views: clients subscribe and refetch check-in
/// history, journal lists, or profile counters when a `check_in_recorded` or
/// `journal_saved` event for their user arrives.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Query(query): Query<WsQuery>,
) -> Response {
    // Browsers cannot set headers on WebSocket upgrades, so the token rides
    // in a query parameter.
    let user_id = match authenticate_ws(&state, query.token.as_deref()) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!("WebSocket auth failed: {}", e);
            return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
        }
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

fn authenticate_ws(state: &AppState, token: Option<&str>) -> Result<Uuid, &'static str> {
    let token = token.ok_or("Missing token query parameter")?;

    let token_data =
        verify_token(token, &state.config).map_err(|_| "Invalid or expired token")?;

    Ok(token_data.claims.sub)
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: Uuid) {
    let (mut sender, mut receiver) = socket.split();

    tracing::debug!(user_id = %user_id, "WebSocket connection established");

    let mut rx = state
        .ws_tx
        .as_ref()
        .map(|tx| tx.subscribe())
        .expect("WebSocket broadcast channel not initialized");

    // Forward this user's change events; events always carry a user_id.
    let mut send_task = tokio::spawn(async move {
        while let Ok(msg) = rx.recv().await {
            if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(&msg) {
                if let Some(msg_user_id) = parsed.get("user_id").and_then(|v| v.as_str()) {
                    if msg_user_id != user_id.to_string() {
                        continue;
                    }
                }
            }
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    // The feed is one-way; client frames only matter for close detection.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if let Message::Close(_) = msg {
                break;
            }
        }
    });

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    tracing::debug!(user_id = %user_id, "WebSocket connection closed");
}
