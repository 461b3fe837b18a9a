//! Handlers for the `/preferences` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use herald_core::types::DbId;
use herald_core::validation::{
    validate_channel, validate_event_type, validate_not_blank, validate_severity_min,
};
use herald_db::models::preference::{NotificationPreference, SavePreference};
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /preferences`.
#[derive(Debug, Default, Deserialize)]
pub struct PreferenceQuery {
    #[serde(default)]
    pub organization_id: DbId,
    pub user_id: Option<DbId>,
    #[serde(default)]
    pub event_type: String,
}

/// GET /api/v1/preferences
///
/// Without `user_id` every row of the organization is returned; with it,
/// org-wide rows and that user's rows.
pub async fn list_preferences(
    State(state): State<AppState>,
    Query(params): Query<PreferenceQuery>,
) -> AppResult<Json<DataResponse<Vec<NotificationPreference>>>> {
    let preferences = state
        .preferences
        .list(params.organization_id, params.user_id, &params.event_type)
        .await?;
    Ok(Json(DataResponse { data: preferences }))
}

/// PUT /api/v1/preferences/{id}
///
/// Update the preference with the path id. An unknown id is a 404.
pub async fn update_preference(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(mut input): Json<SavePreference>,
) -> AppResult<Json<DataResponse<NotificationPreference>>> {
    validate_event_type(&input.event_type)?;
    validate_channel(&input.channel)?;
    validate_not_blank("target", &input.target)?;
    validate_severity_min(&input.severity_min)?;

    input.id = Some(id);
    let saved = state.preferences.save(&input).await?;
    Ok(Json(DataResponse { data: saved }))
}
