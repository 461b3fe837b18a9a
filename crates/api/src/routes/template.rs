use axum::routing::get;
use axum::Router;

use crate::handlers::template;
use crate::state::AppState;

/// Routes mounted at `/templates`.
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/",
        get(template::list_templates).post(template::upsert_template),
    )
}
