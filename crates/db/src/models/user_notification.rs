//! In-app inbox models.

use herald_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `user_notifications` table.
///
/// Rows are created unread and only ever change read state afterwards.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserNotification {
    pub id: DbId,
    pub user_id: DbId,
    pub organization_id: DbId,
    pub title: String,
    pub message: String,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub notification_type: String,
    pub severity: String,
    pub action_url: Option<String>,
    pub read: bool,
    pub payload: serde_json::Value,
    pub created_at: Timestamp,
    pub read_at: Option<Timestamp>,
}

/// DTO for creating an inbox entry.
#[derive(Debug, Clone, Serialize)]
pub struct CreateUserNotification {
    pub user_id: DbId,
    pub organization_id: DbId,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    pub severity: String,
    pub action_url: Option<String>,
    pub payload: serde_json::Value,
}

/// One page of a user's inbox plus the counts the bell UI needs.
#[derive(Debug, Clone, Serialize)]
pub struct InboxPage {
    pub notifications: Vec<UserNotification>,
    pub total: i64,
    pub unread_count: i64,
}
