//! Delivery audit log models.

use herald_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the append-only `notification_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationLog {
    pub id: DbId,
    pub organization_id: DbId,
    pub user_id: Option<DbId>,
    pub event_type: String,
    pub channel: String,
    pub target: String,
    pub status: String,
    pub error: Option<String>,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
}

/// DTO for appending one delivery attempt.
#[derive(Debug, Clone, Serialize)]
pub struct CreateNotificationLog {
    pub organization_id: DbId,
    pub user_id: Option<DbId>,
    pub event_type: String,
    pub channel: String,
    pub target: String,
    pub status: String,
    pub error: Option<String>,
    pub payload: serde_json::Value,
}

/// Optional filters for listing the audit trail. Empty strings and a zero
/// organization mean "any".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NotificationLogFilter {
    #[serde(default)]
    pub organization_id: DbId,
    #[serde(default)]
    pub event_type: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub channel: String,
}
