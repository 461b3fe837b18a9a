//! PostgreSQL-backed implementations of the [`store`](crate::store) traits.
//!
//! [`PgStore`] delegates every call to the matching `herald-db` repository.

use async_trait::async_trait;
use herald_core::types::DbId;
use herald_db::models::notification_log::{
    CreateNotificationLog, NotificationLog, NotificationLogFilter,
};
use herald_db::models::org_settings::OrgSettings;
use herald_db::models::preference::{NotificationPreference, SavePreference};
use herald_db::models::template::{NotificationTemplate, UpsertTemplate};
use herald_db::models::user_notification::{CreateUserNotification, InboxPage, UserNotification};
use herald_db::repositories::{
    InboxRepo, NotificationLogRepo, OrgSettingsRepo, OrgUserRepo, PreferenceRepo, TemplateRepo,
};
use herald_db::DbPool;

use crate::error::StoreError;
use crate::store::{
    InboxStore, NotificationLogStore, OrgSettingsReader, OrgUserDirectory, PreferenceStore,
    TemplateStore,
};

/// All stores over one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TemplateStore for PgStore {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<NotificationTemplate>, StoreError> {
        Ok(TemplateRepo::list(&self.pool, limit, offset).await?)
    }

    async fn upsert(&self, input: &UpsertTemplate) -> Result<NotificationTemplate, StoreError> {
        Ok(TemplateRepo::upsert(&self.pool, input).await?)
    }

    async fn find_by_event_and_channel(
        &self,
        event_type: &str,
        channel: &str,
    ) -> Result<Option<NotificationTemplate>, StoreError> {
        Ok(TemplateRepo::find_by_event_and_channel(&self.pool, event_type, channel).await?)
    }
}

#[async_trait]
impl PreferenceStore for PgStore {
    async fn list(
        &self,
        organization_id: DbId,
        user_id: Option<DbId>,
        event_type: &str,
    ) -> Result<Vec<NotificationPreference>, StoreError> {
        Ok(PreferenceRepo::list(&self.pool, organization_id, user_id, event_type).await?)
    }

    async fn save(&self, input: &SavePreference) -> Result<NotificationPreference, StoreError> {
        Ok(PreferenceRepo::save(&self.pool, input).await?)
    }
}

#[async_trait]
impl NotificationLogStore for PgStore {
    async fn insert(&self, entry: &CreateNotificationLog) -> Result<DbId, StoreError> {
        Ok(NotificationLogRepo::insert(&self.pool, entry).await?)
    }

    async fn list(
        &self,
        filter: &NotificationLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationLog>, StoreError> {
        Ok(NotificationLogRepo::list(&self.pool, filter, limit, offset).await?)
    }
}

#[async_trait]
impl InboxStore for PgStore {
    async fn save(&self, input: &CreateUserNotification) -> Result<UserNotification, StoreError> {
        Ok(InboxRepo::create(&self.pool, input).await?)
    }

    async fn list(
        &self,
        user_id: DbId,
        organization_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<InboxPage, StoreError> {
        Ok(InboxRepo::list(&self.pool, user_id, organization_id, unread_only, limit, offset).await?)
    }

    async fn mark_read(&self, id: DbId, user_id: DbId) -> Result<bool, StoreError> {
        Ok(InboxRepo::mark_read(&self.pool, id, user_id).await?)
    }

    async fn mark_all_read(&self, user_id: DbId) -> Result<u64, StoreError> {
        Ok(InboxRepo::mark_all_read(&self.pool, user_id).await?)
    }

    async fn delete(&self, id: DbId, user_id: DbId) -> Result<bool, StoreError> {
        Ok(InboxRepo::delete(&self.pool, id, user_id).await?)
    }
}

#[async_trait]
impl OrgUserDirectory for PgStore {
    async fn list_user_ids(&self, organization_id: DbId) -> Result<Vec<DbId>, StoreError> {
        Ok(OrgUserRepo::list_user_ids(&self.pool, organization_id).await?)
    }

    async fn list_user_ids_by_role(
        &self,
        organization_id: DbId,
        role: &str,
    ) -> Result<Vec<DbId>, StoreError> {
        Ok(OrgUserRepo::list_user_ids_by_role(&self.pool, organization_id, role).await?)
    }
}

#[async_trait]
impl OrgSettingsReader for PgStore {
    async fn find(&self, organization_id: DbId) -> Result<Option<OrgSettings>, StoreError> {
        Ok(OrgSettingsRepo::find(&self.pool, organization_id).await?)
    }
}
