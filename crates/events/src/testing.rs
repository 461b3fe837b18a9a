//! In-memory fakes for the store, transport and metrics seams.
//!
//! Used by the unit tests of this crate, and by downstream integration tests
//! when the `test-utils` feature is enabled.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use herald_core::types::DbId;
use herald_db::models::notification_log::{
    CreateNotificationLog, NotificationLog, NotificationLogFilter,
};
use herald_db::models::org_settings::OrgSettings;
use herald_db::models::preference::{NotificationPreference, SavePreference};
use herald_db::models::template::{NotificationTemplate, UpsertTemplate};
use herald_db::models::user_notification::{CreateUserNotification, InboxPage, UserNotification};
use serde_json::Value;

use crate::delivery::{ChatSender, DeliveryError, EmailSender, HttpDeliveryError, WebhookSender};
use crate::error::StoreError;
use crate::metrics::MetricsSink;
use crate::store::{
    InboxStore, NotificationLogStore, OrgSettingsReader, OrgUserDirectory, PreferenceStore,
    TemplateStore,
};

fn unavailable(what: &str) -> StoreError {
    StoreError::Unavailable(format!("{what} offline"))
}

/// A stored settings row with every toggle switched on.
pub fn org_settings(organization_id: DbId) -> OrgSettings {
    OrgSettings {
        organization_id,
        email_notifications: true,
        vulnerability_alerts: true,
        weekly_reports: true,
        user_activity_alerts: true,
        admin_email: String::new(),
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// Every store trait over plain vectors.
///
/// Lists come back newest first, like the SQL repositories. The `fail_*`
/// switches make the matching seam return [`StoreError::Unavailable`].
#[derive(Default)]
pub struct MemoryStore {
    next_id: AtomicI64,
    pub templates: Mutex<Vec<NotificationTemplate>>,
    pub preferences: Mutex<Vec<NotificationPreference>>,
    pub logs: Mutex<Vec<NotificationLog>>,
    pub inbox: Mutex<Vec<UserNotification>>,
    /// `(organization_id, user_id, role)` of active users.
    pub users: Mutex<Vec<(DbId, DbId, String)>>,
    pub settings: Mutex<HashMap<DbId, OrgSettings>>,
    pub fail_preferences: AtomicBool,
    pub fail_directory: AtomicBool,
    pub fail_logs: AtomicBool,
    pub fail_inbox: AtomicBool,
}

impl MemoryStore {
    fn id(&self) -> DbId {
        self.next_id.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn add_preference(
        &self,
        organization_id: DbId,
        user_id: Option<DbId>,
        event_type: &str,
        channel: &str,
        target: &str,
        severity_min: &str,
    ) -> DbId {
        let now = Utc::now();
        let id = self.id();
        self.preferences.lock().unwrap().push(NotificationPreference {
            id,
            organization_id,
            user_id,
            event_type: event_type.into(),
            channel: channel.into(),
            target: target.into(),
            enabled: true,
            severity_min: severity_min.into(),
            created_at: now,
            updated_at: now,
        });
        id
    }

    pub fn add_user(&self, organization_id: DbId, user_id: DbId, role: &str) {
        self.users
            .lock()
            .unwrap()
            .push((organization_id, user_id, role.into()));
    }

    pub fn set_settings(&self, settings: OrgSettings) {
        self.settings
            .lock()
            .unwrap()
            .insert(settings.organization_id, settings);
    }

    /// Audit rows in insertion order.
    pub fn log_rows(&self) -> Vec<NotificationLog> {
        self.logs.lock().unwrap().clone()
    }

    /// Inbox rows in insertion order.
    pub fn inbox_rows(&self) -> Vec<UserNotification> {
        self.inbox.lock().unwrap().clone()
    }

    pub fn inbox_for(&self, user_id: DbId) -> Vec<UserNotification> {
        self.inbox_rows()
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect()
    }
}

#[async_trait]
impl TemplateStore for MemoryStore {
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<NotificationTemplate>, StoreError> {
        Ok(self
            .templates
            .lock()
            .unwrap()
            .iter()
            .rev()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn upsert(&self, input: &UpsertTemplate) -> Result<NotificationTemplate, StoreError> {
        let now = Utc::now();
        let row = NotificationTemplate {
            id: self.id(),
            name: input.name.clone(),
            event_type: input.event_type.clone(),
            channel: input.channel.clone(),
            subject: input.subject.clone(),
            body: input.body.clone(),
            is_default: input.is_default,
            created_at: now,
            updated_at: now,
        };
        let mut templates = self.templates.lock().unwrap();
        templates.retain(|t| !(t.event_type == row.event_type && t.channel == row.channel));
        templates.push(row.clone());
        Ok(row)
    }

    async fn find_by_event_and_channel(
        &self,
        event_type: &str,
        channel: &str,
    ) -> Result<Option<NotificationTemplate>, StoreError> {
        Ok(self
            .templates
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.event_type == event_type && t.channel == channel)
            .cloned())
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn list(
        &self,
        organization_id: DbId,
        user_id: Option<DbId>,
        event_type: &str,
    ) -> Result<Vec<NotificationPreference>, StoreError> {
        if self.fail_preferences.load(Ordering::SeqCst) {
            return Err(unavailable("preferences"));
        }
        Ok(self
            .preferences
            .lock()
            .unwrap()
            .iter()
            .filter(|p| organization_id <= 0 || p.organization_id == organization_id)
            .filter(|p| event_type.is_empty() || p.event_type == event_type)
            .filter(|p| match user_id {
                Some(user) => p.user_id.is_none() || p.user_id == Some(user),
                None => true,
            })
            .cloned()
            .collect())
    }

    /// Inserts without an id; otherwise updates that row or fails with
    /// `RowNotFound`.
    async fn save(&self, input: &SavePreference) -> Result<NotificationPreference, StoreError> {
        let id = match input.id {
            Some(id) => id,
            None => self.add_preference(
                input.organization_id,
                input.user_id,
                &input.event_type,
                &input.channel,
                &input.target,
                &input.severity_min,
            ),
        };

        let mut preferences = self.preferences.lock().unwrap();
        let row = preferences
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        row.organization_id = input.organization_id;
        row.user_id = input.user_id;
        row.event_type = input.event_type.clone();
        row.channel = input.channel.clone();
        row.target = input.target.clone();
        row.enabled = input.enabled;
        row.severity_min = input.severity_min.clone();
        row.updated_at = Utc::now();
        Ok(row.clone())
    }
}

#[async_trait]
impl NotificationLogStore for MemoryStore {
    async fn insert(&self, entry: &CreateNotificationLog) -> Result<DbId, StoreError> {
        if self.fail_logs.load(Ordering::SeqCst) {
            return Err(unavailable("logs"));
        }
        let id = self.id();
        self.logs.lock().unwrap().push(NotificationLog {
            id,
            organization_id: entry.organization_id,
            user_id: entry.user_id,
            event_type: entry.event_type.clone(),
            channel: entry.channel.clone(),
            target: entry.target.clone(),
            status: entry.status.clone(),
            error: entry.error.clone(),
            payload: entry.payload.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list(
        &self,
        filter: &NotificationLogFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<NotificationLog>, StoreError> {
        Ok(self
            .logs
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|l| filter.organization_id == 0 || l.organization_id == filter.organization_id)
            .filter(|l| filter.event_type.is_empty() || l.event_type == filter.event_type)
            .filter(|l| filter.status.is_empty() || l.status == filter.status)
            .filter(|l| filter.channel.is_empty() || l.channel == filter.channel)
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InboxStore for MemoryStore {
    async fn save(&self, input: &CreateUserNotification) -> Result<UserNotification, StoreError> {
        if self.fail_inbox.load(Ordering::SeqCst) {
            return Err(unavailable("inbox"));
        }
        let row = UserNotification {
            id: self.id(),
            user_id: input.user_id,
            organization_id: input.organization_id,
            title: input.title.clone(),
            message: input.message.clone(),
            notification_type: input.notification_type.clone(),
            severity: input.severity.clone(),
            action_url: input.action_url.clone(),
            read: false,
            payload: input.payload.clone(),
            created_at: Utc::now(),
            read_at: None,
        };
        self.inbox.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list(
        &self,
        user_id: DbId,
        organization_id: DbId,
        unread_only: bool,
        limit: i64,
        offset: i64,
    ) -> Result<InboxPage, StoreError> {
        let inbox = self.inbox.lock().unwrap();
        let owned: Vec<_> = inbox
            .iter()
            .rev()
            .filter(|n| n.user_id == user_id)
            .filter(|n| organization_id == 0 || n.organization_id == organization_id)
            .collect();
        let unread_count = owned.iter().filter(|n| !n.read).count() as i64;
        let matching: Vec<_> = owned
            .into_iter()
            .filter(|n| !unread_only || !n.read)
            .collect();
        Ok(InboxPage {
            total: matching.len() as i64,
            unread_count,
            notifications: matching
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect(),
        })
    }

    async fn mark_read(&self, id: DbId, user_id: DbId) -> Result<bool, StoreError> {
        let mut inbox = self.inbox.lock().unwrap();
        match inbox.iter_mut().find(|n| n.id == id && n.user_id == user_id) {
            Some(row) => {
                row.read = true;
                row.read_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn mark_all_read(&self, user_id: DbId) -> Result<u64, StoreError> {
        let mut inbox = self.inbox.lock().unwrap();
        let mut marked = 0;
        for row in inbox.iter_mut().filter(|n| n.user_id == user_id && !n.read) {
            row.read = true;
            row.read_at = Some(Utc::now());
            marked += 1;
        }
        Ok(marked)
    }

    async fn delete(&self, id: DbId, user_id: DbId) -> Result<bool, StoreError> {
        let mut inbox = self.inbox.lock().unwrap();
        let before = inbox.len();
        inbox.retain(|n| !(n.id == id && n.user_id == user_id));
        Ok(inbox.len() != before)
    }
}

#[async_trait]
impl OrgUserDirectory for MemoryStore {
    async fn list_user_ids(&self, organization_id: DbId) -> Result<Vec<DbId>, StoreError> {
        if self.fail_directory.load(Ordering::SeqCst) {
            return Err(unavailable("directory"));
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|(org, _, _)| *org == organization_id)
            .map(|(_, user, _)| *user)
            .collect())
    }

    async fn list_user_ids_by_role(
        &self,
        organization_id: DbId,
        role: &str,
    ) -> Result<Vec<DbId>, StoreError> {
        if self.fail_directory.load(Ordering::SeqCst) {
            return Err(unavailable("directory"));
        }
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|(org, _, r)| *org == organization_id && r == role)
            .map(|(_, user, _)| *user)
            .collect())
    }
}

#[async_trait]
impl OrgSettingsReader for MemoryStore {
    async fn find(&self, organization_id: DbId) -> Result<Option<OrgSettings>, StoreError> {
        Ok(self.settings.lock().unwrap().get(&organization_id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Transports and metrics
// ---------------------------------------------------------------------------

/// Records every send; channels listed in `failing` return an error.
///
/// `sent` keeps `(channel, text)` across all channels in send order. Email
/// text is `"<recipients>: <body>"` and webhook text is the URL.
#[derive(Default)]
pub struct RecordingTransport {
    pub emails: Mutex<Vec<(Vec<String>, String, String)>>,
    pub chats: Mutex<Vec<(String, String)>>,
    pub webhooks: Mutex<Vec<(String, Value)>>,
    pub sent: Mutex<Vec<(String, String)>>,
    failing: Mutex<HashSet<&'static str>>,
}

impl RecordingTransport {
    pub fn fail_channel(&self, channel: &'static str) {
        self.failing.lock().unwrap().insert(channel);
    }

    fn record(&self, channel: &'static str, text: String) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push((channel.into(), text));
        if self.failing.lock().unwrap().contains(channel) {
            return Err(HttpDeliveryError::HttpStatus(503).into());
        }
        Ok(())
    }

    pub fn send_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn channels(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(channel, _)| channel.clone())
            .collect()
    }
}

#[async_trait]
impl EmailSender for RecordingTransport {
    async fn send_email(
        &self,
        to: &[String],
        subject: &str,
        body: &str,
    ) -> Result<(), DeliveryError> {
        self.emails
            .lock()
            .unwrap()
            .push((to.to_vec(), subject.into(), body.into()));
        self.record("email", format!("{}: {body}", to.join(",")))
    }
}

#[async_trait]
impl ChatSender for RecordingTransport {
    async fn send_chat_message(&self, webhook_url: &str, text: &str) -> Result<(), DeliveryError> {
        self.chats
            .lock()
            .unwrap()
            .push((webhook_url.into(), text.into()));
        self.record("slack", text.into())
    }
}

#[async_trait]
impl WebhookSender for RecordingTransport {
    async fn send_webhook(&self, url: &str, payload: &Value) -> Result<(), DeliveryError> {
        self.webhooks
            .lock()
            .unwrap()
            .push((url.into(), payload.clone()));
        self.record("webhook", url.into())
    }
}

/// Records `(channel, status)` observations.
#[derive(Default)]
pub struct RecordingMetrics {
    pub observations: Mutex<Vec<(String, String)>>,
}

impl MetricsSink for RecordingMetrics {
    fn observe_send(&self, channel: &str, status: &str, _duration: Duration) {
        self.observations
            .lock()
            .unwrap()
            .push((channel.into(), status.into()));
    }
}
