//! Handlers for the in-app `/inbox` resource.
//!
//! Every endpoint acts for the [`CallerId`] and only touches that user's rows.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use herald_core::error::CoreError;
use herald_core::types::DbId;
use herald_db::models::user_notification::InboxPage;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::caller::CallerId;
use crate::query::PaginationParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /inbox`.
#[derive(Debug, Default, Deserialize)]
pub struct InboxQuery {
    /// `0` lists across organizations.
    #[serde(default)]
    pub organization_id: DbId,
    #[serde(default)]
    pub unread_only: bool,
}

#[derive(Debug, Serialize)]
pub struct MarkedRead {
    pub marked_read: u64,
}

/// GET /api/v1/inbox
pub async fn list_inbox(
    CallerId(user_id): CallerId,
    State(state): State<AppState>,
    Query(params): Query<InboxQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<DataResponse<InboxPage>>> {
    let (limit, offset) = page.clamped();
    let inbox = state
        .inbox
        .list(user_id, params.organization_id, params.unread_only, limit, offset)
        .await?;
    Ok(Json(DataResponse { data: inbox }))
}

/// PATCH /api/v1/inbox/{id}/read
pub async fn mark_read(
    CallerId(user_id): CallerId,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !state.inbox.mark_read(id, user_id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/inbox/read-all
pub async fn mark_all_read(
    CallerId(user_id): CallerId,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<MarkedRead>>> {
    let marked_read = state.inbox.mark_all_read(user_id).await?;
    Ok(Json(DataResponse {
        data: MarkedRead { marked_read },
    }))
}

/// DELETE /api/v1/inbox/{id}
pub async fn delete_notification(
    CallerId(user_id): CallerId,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !state.inbox.delete(id, user_id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Notification",
        id,
    })
}
