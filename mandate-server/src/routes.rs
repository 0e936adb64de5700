use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use mandate_protocol::BusinessProfile;
use mandate_rules::{Catalog, RuleEngine};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::idempotency::IdempotencyKey;
use crate::repository::StoredRule;
use crate::AppState;

const DEFAULT_RULE_LIMIT: i64 = 20;
const MAX_RULE_LIMIT: i64 = 500;

#[derive(Serialize)]
struct HealthResponse {
    ok: bool,
    version: &'static str,
    ruleset: i64,
}

pub(crate) async fn health_status(State(state): State<AppState>) -> impl IntoResponse {
    match state.repository.rule_count().await {
        Ok(count) => Json(HealthResponse {
            ok: true,
            version: state.version,
            ruleset: count,
        })
        .into_response(),
        Err(err) => {
            warn!(?err, "health check could not reach the database");
            let body = Json(json!({ "ok": false, "error": "database_unavailable" }));
            (StatusCode::SERVICE_UNAVAILABLE, body).into_response()
        }
    }
}

#[derive(Deserialize)]
pub(crate) struct ListRulesQuery {
    #[serde(default)]
    limit: Option<i64>,
}

pub(crate) async fn list_rules(
    State(state): State<AppState>,
    Query(query): Query<ListRulesQuery>,
) -> Result<Json<Vec<StoredRule>>, AppError> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RULE_LIMIT)
        .clamp(1, MAX_RULE_LIMIT);
    let rules = state
        .repository
        .list_rules(limit)
        .await
        .map_err(|err| AppError::internal(err.to_string()))?;

    Ok(Json(rules))
}

pub(crate) async fn evaluate(
    State(state): State<AppState>,
    key: Option<Extension<IdempotencyKey>>,
    body: Result<Json<BusinessProfile>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(profile) =
        body.map_err(|rejection| AppError::malformed_body(rejection.body_text()))?;

    if let Err(err) = profile.validate() {
        return Err(AppError::invalid_profile(err.violations));
    }

    let rules = state
        .repository
        .load_rules()
        .await
        .map_err(|err| AppError::catalog_unavailable(err.to_string()))?;
    let catalog =
        Catalog::from_rules(rules).map_err(|err| AppError::catalog_unavailable(err.to_string()))?;
    let engine = RuleEngine::new(catalog);

    let report = engine.evaluate(&profile);
    let results =
        serde_json::to_value(&report).map_err(|err| AppError::internal(err.to_string()))?;
    info!(
        hits = report.hits.len(),
        obligations = report.obligations.len(),
        "profile evaluated"
    );

    if let Some(Extension(IdempotencyKey(key))) = key {
        let session_id = state
            .repository
            .upsert_session(&key, &profile)
            .await
            .map_err(|err| AppError::internal(err.to_string()))?;
        state
            .repository
            .append_evaluation(session_id, &profile, &results, &report.fingerprint())
            .await
            .map_err(|err| AppError::internal(err.to_string()))?;
        debug!(%session_id, "stored evaluation under idempotency key");
    }

    Ok(Json(results))
}
