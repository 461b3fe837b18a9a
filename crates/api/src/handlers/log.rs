//! Handler for the delivery audit trail.

use axum::extract::{Query, State};
use axum::Json;
use herald_db::models::notification_log::{NotificationLog, NotificationLogFilter};

use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/logs
///
/// Filters on `organization_id`, `event_type`, `status` and `channel`,
/// newest first.
pub async fn list_logs(
    State(state): State<AppState>,
    Query(filter): Query<NotificationLogFilter>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<Vec<NotificationLog>>>> {
    let (limit, offset) = page.clamped();
    let logs = state.logs.list(&filter, limit, offset).await?;
    Ok(Json(DataResponse { data: logs }))
}
