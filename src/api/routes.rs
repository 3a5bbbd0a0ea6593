use crate::AppState;
use crate::api::handlers;
use axum::{
    Router, middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

pub fn create_router() -> Router<AppState> {
    let public_routes = Router::new().route("/health", get(handlers::health));

    let protected_routes = Router::new()
        // Chat relays
        .route("/api/chat/history", get(handlers::chat::history))
        .route("/api/chat/send", post(handlers::chat::send))
        .route(
            "/api/chat/mark-plan/{message_id}",
            put(handlers::chat::mark_plan),
        )
        // Progress relays
        .route(
            "/api/v1/progress/analysis",
            get(handlers::progress::analysis),
        )
        .route(
            "/api/v1/progress/adaptive-plan",
            post(handlers::progress::adaptive_plan),
        )
        .layer(middleware::from_fn(
            crate::auth::middleware::require_authorization,
        ));

    public_routes.merge(protected_routes)
}

/// The full proxy service: routes, state and tower-http layers.
pub fn app(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    create_router()
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
