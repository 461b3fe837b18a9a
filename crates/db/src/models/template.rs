//! Notification template models.

use herald_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `notification_templates` table.
///
/// `subject` and `body` are template strings rendered against the
/// `event.*` / `payload.*` context. An empty `channel` marks the base
/// template used for in-app inbox content.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotificationTemplate {
    pub id: DbId,
    pub name: String,
    pub event_type: String,
    pub channel: String,
    pub subject: String,
    pub body: String,
    pub is_default: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting or replacing the template keyed by `(event_type, channel)`.
#[derive(Debug, Clone, Deserialize)]
pub struct UpsertTemplate {
    #[serde(default)]
    pub name: String,
    pub event_type: String,
    #[serde(default)]
    pub channel: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub is_default: bool,
}
