//! Notification preference models.

use herald_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notification_preferences` table.
///
/// `user_id = None` applies organization-wide; a concrete user id scopes the
/// row to that user. `severity_min` is empty when no severity gate applies.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationPreference {
    pub id: DbId,
    pub organization_id: DbId,
    pub user_id: Option<DbId>,
    pub event_type: String,
    pub channel: String,
    pub target: String,
    pub enabled: bool,
    pub severity_min: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for saving a preference.
///
/// A positive `id` updates that row in place; otherwise the row is upserted
/// by its `(organization_id, user_id, event_type, channel)` scope.
#[derive(Debug, Clone, Deserialize)]
pub struct SavePreference {
    #[serde(default)]
    pub id: Option<DbId>,
    pub organization_id: DbId,
    #[serde(default)]
    pub user_id: Option<DbId>,
    pub event_type: String,
    pub channel: String,
    pub target: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub severity_min: String,
}

fn default_enabled() -> bool {
    true
}
