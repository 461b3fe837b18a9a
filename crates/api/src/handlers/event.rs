//! Internal event ingress.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use herald_core::error::CoreError;
use herald_events::normalize::normalize;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub const SERVICE_TOKEN_HEADER: &str = "x-service-token";

/// POST /api/v1/events
///
/// Accepts one event from a trusted internal service and handles it
/// inline. The body may use any envelope shape the bus consumer accepts.
pub async fn ingest_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<(StatusCode, Json<Value>)> {
    let engine = state
        .engine
        .as_ref()
        .ok_or_else(|| AppError::ServiceUnavailable("notifier unavailable".into()))?;

    let expected = state.config.service_token.as_str();
    if !expected.is_empty() {
        let presented = headers
            .get(SERVICE_TOKEN_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if presented != expected {
            return Err(CoreError::Unauthorized("unauthorized".into()).into());
        }
    }

    let event = normalize(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed event body");
        AppError::BadRequest("invalid body".into())
    })?;
    let outcome = engine.handle_event(&event).await;
    tracing::debug!(
        event_type = %event.event_type,
        inbox_created = outcome.inbox_created,
        targets = outcome.targets,
        sent = outcome.dispatch.sent,
        failed = outcome.dispatch.failed,
        "Ingested event"
    );

    Ok((StatusCode::ACCEPTED, Json(json!({ "status": "accepted" }))))
}
