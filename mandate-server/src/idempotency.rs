use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use mandate_protocol::{IDEMPOTENCY_KEY_HEADER, REPLAY_HEADER};
use tracing::{debug, warn};

use crate::AppState;

/// Key captured by the middleware and consumed by the evaluate handler to
/// persist the session and its evaluation.
#[derive(Debug, Clone)]
pub struct IdempotencyKey(pub String);

/// Short-circuits evaluate requests whose `Idempotency-Key` already has a
/// stored result, replaying it with an `Idempotent-Replay: true` header.
///
/// A key without history passes through; the handler stores the fresh result
/// under it. Lookup failures also pass through so a flaky read never blocks
/// an evaluation.
pub async fn replay_stored_result(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let Some(key) = request
        .headers()
        .get(IDEMPOTENCY_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
    else {
        return next.run(request).await;
    };

    match state.repository.stored_result_for_key(&key).await {
        Ok(Some(results)) => {
            debug!(%key, "replaying stored evaluation result");
            let mut response = Json(results).into_response();
            response
                .headers_mut()
                .insert(REPLAY_HEADER, HeaderValue::from_static("true"));
            response
        }
        Ok(None) => {
            request.extensions_mut().insert(IdempotencyKey(key));
            next.run(request).await
        }
        Err(err) => {
            warn!(%key, ?err, "idempotency lookup failed; evaluating fresh");
            request.extensions_mut().insert(IdempotencyKey(key));
            next.run(request).await
        }
    }
}
