//! Store and directory interfaces the engine and the HTTP layer consume.
//!
//! Row and DTO types are shared with `herald-db`. The Postgres-backed
//! implementations live in [`pg`](crate::pg); tests substitute in-memory
//! fakes.

use async_trait::async_trait;
use herald_core::types::DbId;
use herald_db::models::notification_log::{
    CreateNotificationLog, NotificationLog, NotificationLogFilter,
};
use herald_db::models::org_settings::OrgSettings;
use herald_db::models::preference::{NotificationPreference, SavePreference};
use herald_db::models::template::{NotificationTemplate, UpsertTemplate};
use herald_db::models::user_notification::{CreateUserNotification, InboxPage, UserNotification};

use crate::error::StoreError;

/// Persisted template overrides keyed by `(event_type, channel)`.
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<NotificationTemplate>, StoreError>;

    async fn upsert(&self, input: &UpsertTemplate) -> Result<NotificationTemplate, StoreError>;

    /// Best match for the key, preferring default rows, then the most
    /// recently updated.
    async fn find_by_event_and_channel(
        &self,
        event_type: &str,
        channel: &str,
    ) -> Result<Option<NotificationTemplate>, StoreError>;
}

/// Routing preferences.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Preferences for an organization and event type. When `user_id` is
    /// given, org-wide rows and that user's rows both match.
    async fn list(
        &self,
        organization_id: DbId,
        user_id: Option<DbId>,
        event_type: &str,
    ) -> Result<Vec<NotificationPreference>, StoreError>;

    /// Insert-or-update by id; without an id, upsert by scope.
    async fn save(&self, input: &SavePreference) -> Result<NotificationPreference, StoreError>;
}

/// Append-only delivery audit trail.
#[async_trait]
pub trait NotificationLogStore: Send + Sync {
    async fn insert(&self, entry: &CreateNotificationLog) -> Result<DbId, StoreError>;

    async fn list(
        &self,
        filter: &NotificationLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationLog>, StoreError>;
}

/// In-app inbox rows.
#[async_trait]
pub trait InboxStore: Send + Sync {
    async fn save(&self, input: &CreateUserNotification) -> Result<UserNotification, StoreError>;

    async fn list(
        &self,
        user_id: DbId,
        organization_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<InboxPage, StoreError>;

    /// Returns `false` when no row owned by `user_id` matched.
    async fn mark_read(&self, id: DbId, user_id: DbId) -> Result<bool, StoreError>;

    /// Returns the number of rows transitioned to read.
    async fn mark_all_read(&self, user_id: DbId) -> Result<u64, StoreError>;

    async fn delete(&self, id: DbId, user_id: DbId) -> Result<bool, StoreError>;
}

/// Active users of an organization, used for inbox broadcasts.
#[async_trait]
pub trait OrgUserDirectory: Send + Sync {
    async fn list_user_ids(&self, organization_id: DbId) -> Result<Vec<DbId>, StoreError>;

    async fn list_user_ids_by_role(
        &self,
        organization_id: DbId,
        role: &str,
    ) -> Result<Vec<DbId>, StoreError>;
}

/// Uncached organization settings lookup behind
/// [`OrgSettingsCache`](crate::settings_cache::OrgSettingsCache).
#[async_trait]
pub trait OrgSettingsReader: Send + Sync {
    async fn find(&self, organization_id: DbId) -> Result<Option<OrgSettings>, StoreError>;
}
