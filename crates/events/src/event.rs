//! The canonical notification event.

use chrono::Utc;
use herald_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Event
// ---------------------------------------------------------------------------

/// A notification-worthy occurrence, normalized from whatever envelope the
/// producer used.
///
/// Serializes with the producer wire names (`type`, `emails`, ...), which
/// is also the shape generic webhooks receive under `"event"`.
///
/// An empty `event_type` marks a no-op: it is dropped before any side
/// effect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Dot-delimited namespace, e.g. `"payment.success"`.
    #[serde(rename = "type")]
    pub event_type: String,

    pub organization_id: DbId,

    /// Set for events aimed at one user. `Some(0)` is treated as unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<DbId>,

    /// Free-form severity label. Empty when the producer sent none.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub severity: String,

    /// Producer-supplied email recipients, used only by the fallback pass.
    #[serde(rename = "emails", default, skip_serializing_if = "Vec::is_empty")]
    pub target_emails: Vec<String>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub slack_webhook: String,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub webhook_url: String,

    #[serde(default)]
    pub payload: Map<String, Value>,

    pub occurred_at: Timestamp,
}

impl Event {
    /// Create an organization-less event of the given type, stamped now.
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            organization_id: 0,
            user_id: None,
            severity: String::new(),
            target_emails: Vec::new(),
            slack_webhook: String::new(),
            webhook_url: String::new(),
            payload: Map::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn with_organization(mut self, organization_id: DbId) -> Self {
        self.organization_id = organization_id;
        self
    }

    pub fn with_user(mut self, user_id: DbId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn with_severity(mut self, severity: impl Into<String>) -> Self {
        self.severity = severity.into();
        self
    }

    pub fn with_target_emails<I, S>(mut self, emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target_emails = emails.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_slack_webhook(mut self, url: impl Into<String>) -> Self {
        self.slack_webhook = url.into();
        self
    }

    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = url.into();
        self
    }

    /// Set the payload. Non-object values are ignored.
    pub fn with_payload(mut self, payload: Value) -> Self {
        if let Value::Object(map) = payload {
            self.payload = map;
        }
        self
    }

    /// The user this event targets, if any. A zero id counts as none.
    pub fn target_user(&self) -> Option<DbId> {
        self.user_id.filter(|id| *id != 0)
    }

    /// Whether the event should be dropped without side effects.
    pub fn is_noop(&self) -> bool {
        self.event_type.is_empty()
    }

    /// Read a string field from the payload.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    /// The `event.*` branch of the template context.
    pub fn context_view(&self) -> EventView<'_> {
        EventView {
            event_type: &self.event_type,
            organization_id: self.organization_id,
            user_id: self.user_id,
            severity: &self.severity,
            occurred_at: self.occurred_at,
        }
    }

    /// The payload persisted with each audit row: the event payload with
    /// `event_type` and `occurred_at` merged in.
    pub fn audit_payload(&self) -> Value {
        let mut payload = self.payload.clone();
        payload.insert("event_type".into(), Value::String(self.event_type.clone()));
        payload.insert(
            "occurred_at".into(),
            Value::String(self.occurred_at.to_rfc3339()),
        );
        Value::Object(payload)
    }
}

/// Template-facing projection of an [`Event`].
#[derive(Debug, Serialize)]
pub struct EventView<'a> {
    #[serde(rename = "type")]
    pub event_type: &'a str,
    pub organization_id: DbId,
    pub user_id: Option<DbId>,
    pub severity: &'a str,
    pub occurred_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
