use axum::{
    Router,
    routing::{get, post},
};

use reclaim_core::health::healthz;
use reclaim_core::middleware::with_http_layers;

use crate::handlers::{
    health::readyz,
    password_reset::{consume_token, request_challenge, verify_challenge},
};
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let router = Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Password reset
        .route("/password-reset/challenge", post(request_challenge))
        .route("/password-reset/verification", post(verify_challenge))
        .route("/password-reset/credential", post(consume_token))
        .with_state(state);
    with_http_layers(router)
}
