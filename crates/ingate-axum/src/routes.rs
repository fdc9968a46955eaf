//! Router construction.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;

use crate::handlers;
use crate::middleware::{
    build_cors_layer, guard_upload_size, handle_panic, require_bearer, tag_request,
};
use crate::state::AppState;

pub const HEALTH_PATH: &str = "/health";
pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
pub const MODELS_PATH: &str = "/v1/models";
pub const TRANSCRIBE_PATH: &str = "/v1/transcribe";
pub const ANALYZE_PATH: &str = "/v1/analyze";

/// Build the gateway router with the full middleware chain.
pub fn create_router(state: AppState) -> Router {
    let audio_limit = DefaultBodyLimit::max(state.request_ceiling);
    let chat_limit = DefaultBodyLimit::max(state.chat_body_limit());

    let routes = Router::new()
        .route(HEALTH_PATH, get(handlers::health::health))
        .route(
            CHAT_COMPLETIONS_PATH,
            post(handlers::chat::chat_completions).layer(chat_limit),
        )
        .route(MODELS_PATH, get(handlers::chat::models))
        .route(
            TRANSCRIBE_PATH,
            post(handlers::audio::transcribe).layer(audio_limit),
        )
        .route(
            ANALYZE_PATH,
            post(handlers::audio::analyze).layer(audio_limit),
        );

    with_gateway_layers(routes, &state).with_state(state)
}

/// Wrap `routes` in the middleware chain.
///
/// The last layer added is the outermost, so requests pass through
/// request-id tagging, panic recovery, authentication, the upload size
/// guard and CORS, in that order.
pub fn with_gateway_layers(routes: Router<AppState>, state: &AppState) -> Router<AppState> {
    routes
        .layer(build_cors_layer(&state.config().allowed_origins))
        .layer(from_fn_with_state(state.clone(), guard_upload_size))
        .layer(from_fn_with_state(state.clone(), require_bearer))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(tag_request))
}
