//! HTTP service exposing the Mandate evaluation engine.
//!
//! The catalog lives in Postgres; every evaluate request loads it, derives
//! facts from the submitted profile and returns the matched obligations.
//! Requests carrying an `Idempotency-Key` header replay their latest stored
//! result instead of evaluating again.

mod error;
mod idempotency;
mod repository;
mod routes;
mod seed;

pub use error::AppError;
pub use repository::{EvaluationRepository, StoredRule};
pub use seed::{seed_catalog, SeedSummary};

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Request bodies above this size are rejected before JSON parsing.
const MAX_BODY_BYTES: usize = 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub repository: EvaluationRepository,
    pub version: &'static str,
}

/// Assembles the API router. The idempotency middleware sits on the evaluate
/// route only; listing and health never consult session state.
pub fn build_router(state: AppState) -> Router {
    let evaluate_routes = Router::new()
        .route("/api/evaluate", post(routes::evaluate))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            idempotency::replay_stored_result,
        ));

    Router::new()
        .route("/api/health/status", get(routes::health_status))
        .route("/api/rules", get(routes::list_rules))
        .merge(evaluate_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
