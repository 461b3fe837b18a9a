pub mod event;
pub mod health;
pub mod inbox;
pub mod log;
pub mod metrics;
pub mod preference;
pub mod template;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /templates                  list (?limit, offset), upsert (POST)
/// /preferences                list (?organization_id, user_id, event_type)
/// /preferences/{id}           update (PUT)
/// /logs                       list (?organization_id, event_type, status, channel, limit, offset)
/// /inbox                      list (?organization_id, unread_only, limit, offset)
/// /inbox/read-all             mark all read (PATCH)
/// /inbox/{id}                 delete (DELETE)
/// /inbox/{id}/read            mark read (PATCH)
/// /events                     ingest (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/templates", template::router())
        .nest("/preferences", preference::router())
        .nest("/logs", log::router())
        .nest("/inbox", inbox::router())
        .nest("/events", event::router())
}
