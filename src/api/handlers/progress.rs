use crate::{AppState, api::relay, types::Result};
use axum::{
    extract::{Request, State},
    response::Response,
};

/// Relay `GET /api/v1/progress/analysis`
pub async fn analysis(State(state): State<AppState>, req: Request) -> Result<Response> {
    relay::forward(
        &state,
        "/api/v1/progress/analysis",
        "Failed to fetch progress analysis",
        req,
    )
    .await
}

/// Relay `POST /api/v1/progress/adaptive-plan`
pub async fn adaptive_plan(State(state): State<AppState>, req: Request) -> Result<Response> {
    relay::forward(
        &state,
        "/api/v1/progress/adaptive-plan",
        "Failed to generate adaptive plan",
        req,
    )
    .await
}
