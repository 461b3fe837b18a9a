//! Handlers for the `/templates` resource.

use axum::extract::{Query, State};
use axum::Json;
use herald_core::validation::{validate_event_type, validate_not_blank, validate_template_channel};
use herald_db::models::template::{NotificationTemplate, UpsertTemplate};

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/templates
pub async fn list_templates(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<NotificationTemplate>>>> {
    let (limit, offset) = params.clamped();
    let templates = state.templates.list(limit, offset).await?;
    Ok(Json(DataResponse { data: templates }))
}

/// POST /api/v1/templates
///
/// Insert or replace the template for `(event_type, channel)`. An empty
/// channel stores the base template used for inbox content.
pub async fn upsert_template(
    State(state): State<AppState>,
    Json(input): Json<UpsertTemplate>,
) -> AppResult<Json<DataResponse<NotificationTemplate>>> {
    validate_event_type(&input.event_type)?;
    validate_template_channel(&input.channel)?;
    validate_not_blank("subject", &input.subject)?;
    validate_not_blank("body", &input.body)?;

    let saved = state.templates.upsert(&input).await?;
    tracing::info!(
        event_type = %saved.event_type,
        channel = %saved.channel,
        "Template saved"
    );
    Ok(Json(DataResponse { data: saved }))
}
