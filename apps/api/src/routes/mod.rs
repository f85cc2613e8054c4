pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::exam::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/exams/generate", post(handlers::handle_generate))
        .route("/api/v1/exams/resolve", post(handlers::handle_resolve))
        .route(
            "/api/v1/exams/validate-marks",
            post(handlers::handle_validate_marks),
        )
        .with_state(state)
}
