use axum::routing::{delete, get, patch};
use axum::Router;

use crate::handlers::inbox;
use crate::state::AppState;

/// Routes mounted at `/inbox`.
///
/// ```text
/// GET    /               -> list_inbox
/// PATCH  /read-all       -> mark_all_read
/// PATCH  /{id}/read      -> mark_read
/// DELETE /{id}           -> delete_notification
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(inbox::list_inbox))
        .route("/read-all", patch(inbox::mark_all_read))
        .route("/{id}/read", patch(inbox::mark_read))
        .route("/{id}", delete(inbox::delete_notification))
}
