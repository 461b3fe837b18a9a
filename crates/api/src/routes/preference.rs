use axum::routing::{get, put};
use axum::Router;

use crate::handlers::preference;
use crate::state::AppState;

/// Routes mounted at `/preferences`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(preference::list_preferences))
        .route("/{id}", put(preference::update_preference))
}
