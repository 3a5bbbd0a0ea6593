use crate::{AppState, api::relay, types::Result};
use axum::{
    extract::{Path, Request, State},
    response::Response,
};

const FAILURE: &str = "Internal server error";

/// Relay `GET /api/v1/chat/history`
pub async fn history(State(state): State<AppState>, req: Request) -> Result<Response> {
    relay::forward(&state, "/api/v1/chat/history", FAILURE, req).await
}

/// Relay `POST /api/v1/chat/send`
pub async fn send(State(state): State<AppState>, req: Request) -> Result<Response> {
    relay::forward(&state, "/api/v1/chat/send", FAILURE, req).await
}

/// Relay `PUT /api/v1/chat/message/{message_id}/mark-plan`
pub async fn mark_plan(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
    req: Request,
) -> Result<Response> {
    let upstream = format!("/api/v1/chat/message/{}/mark-plan", message_id);
    relay::forward(&state, &upstream, FAILURE, req).await
}
