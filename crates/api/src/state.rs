use std::sync::Arc;

use herald_events::store::{InboxStore, NotificationLogStore, PreferenceStore, TemplateStore};
use herald_events::{DeliveryMetrics, Engine};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: every field is behind an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// `None` when the delivery transports could not be built; event
    /// ingress then answers 503.
    pub engine: Option<Arc<Engine>>,
    pub templates: Arc<dyn TemplateStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub logs: Arc<dyn NotificationLogStore>,
    pub inbox: Arc<dyn InboxStore>,
    pub metrics: Arc<DeliveryMetrics>,
    /// Database pool probed by `/health`, when running against Postgres.
    pub pool: Option<herald_db::DbPool>,
}
