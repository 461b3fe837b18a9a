//! Event handling entry point.
//!
//! [`Engine::handle_event`] runs one event to completion through a fixed
//! sequence:
//!
//! ```text
//! received -> inbox fan-out -> targets resolved
//!          -> per target { template resolved -> rendered -> dispatched -> logged }
//!          -> done
//! ```
//!
//! Lookup failures degrade to defaults and send failures are recorded, so
//! every event reaches the end. The engine holds no mutable state of its
//! own and is shared across the bus consumer and HTTP handlers via `Arc`.

use std::sync::Arc;

use herald_core::channels::CHANNEL_BASE;
use herald_db::models::org_settings::OrgSettings;
use herald_db::models::user_notification::CreateUserNotification;
use serde_json::Value;

use crate::config::DeliveryDefaults;
use crate::delivery::{ChatSender, EmailSender, WebhookSender};
use crate::dispatcher::{DispatchSummary, Dispatcher};
use crate::error::EngineError;
use crate::event::Event;
use crate::metrics::MetricsSink;
use crate::normalize::normalize;
use crate::routing::TargetResolver;
use crate::settings_cache::OrgSettingsCache;
use crate::store::{
    InboxStore, NotificationLogStore, OrgUserDirectory, PreferenceStore, TemplateStore,
};
use crate::templates::{TemplateRenderer, TemplateResolver};

/// Collaborators the engine is assembled from.
pub struct EngineParts {
    pub templates: Arc<dyn TemplateStore>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub logs: Arc<dyn NotificationLogStore>,
    pub inbox: Arc<dyn InboxStore>,
    pub directory: Arc<dyn OrgUserDirectory>,
    pub settings: Arc<OrgSettingsCache>,
    pub email: Arc<dyn EmailSender>,
    pub chat: Arc<dyn ChatSender>,
    pub webhook: Arc<dyn WebhookSender>,
    pub metrics: Option<Arc<dyn MetricsSink>>,
    pub defaults: DeliveryDefaults,
}

/// What happened to one event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandleOutcome {
    pub inbox_created: usize,
    pub targets: usize,
    pub dispatch: DispatchSummary,
}

pub struct Engine {
    templates: Arc<TemplateResolver>,
    renderer: Arc<TemplateRenderer>,
    resolver: TargetResolver,
    dispatcher: Dispatcher,
    inbox: Arc<dyn InboxStore>,
    settings: Arc<OrgSettingsCache>,
}

impl Engine {
    pub fn new(parts: EngineParts) -> Self {
        let templates = Arc::new(TemplateResolver::new(parts.templates));
        let renderer = Arc::new(TemplateRenderer::new());
        let dispatcher = Dispatcher::new(
            templates.clone(),
            renderer.clone(),
            parts.email,
            parts.chat,
            parts.webhook,
            parts.logs,
            parts.metrics,
        );
        Self {
            templates,
            renderer,
            resolver: TargetResolver::new(parts.preferences, parts.directory, parts.defaults),
            dispatcher,
            inbox: parts.inbox,
            settings: parts.settings,
        }
    }

    /// Normalize raw message bytes and handle the resulting event.
    ///
    /// Only a parse failure is an error; an event without a type is a
    /// successful no-op.
    pub async fn ingest(&self, raw: &[u8]) -> Result<HandleOutcome, EngineError> {
        let event = normalize(raw)?;
        Ok(self.handle_event(&event).await)
    }

    /// Handle one canonical event to completion.
    pub async fn handle_event(&self, event: &Event) -> HandleOutcome {
        if event.is_noop() {
            tracing::debug!("Dropping event without a type");
            return HandleOutcome::default();
        }

        let ctx = TemplateRenderer::context(event);
        let mut outcome = HandleOutcome {
            inbox_created: self.fan_out_inbox(event, &ctx).await,
            ..HandleOutcome::default()
        };

        let settings = self.org_settings(event).await;
        let targets = self.resolver.resolve_targets(event, settings.as_ref()).await;
        if targets.is_empty() {
            tracing::debug!(
                event_type = %event.event_type,
                organization_id = event.organization_id,
                "No targets resolved for event"
            );
            return outcome;
        }

        outcome.targets = targets.len();
        outcome.dispatch = self.dispatcher.dispatch(event, &targets, &ctx).await;
        outcome
    }

    /// Create one inbox row per recipient from the channel-agnostic
    /// template. Returns the number of rows written.
    async fn fan_out_inbox(&self, event: &Event, ctx: &minijinja::Value) -> usize {
        let recipients = self.resolver.resolve_inbox_recipients(event).await;
        if recipients.is_empty() {
            return 0;
        }

        let template = self.templates.resolve(&event.event_type, CHANNEL_BASE).await;
        let rendered = self.renderer.render(&template, ctx);
        let action_url = event
            .payload_str("action_url")
            .filter(|url| !url.is_empty())
            .map(str::to_string);
        let payload = Value::Object(event.payload.clone());

        let mut created = 0;
        for user_id in recipients {
            let entry = CreateUserNotification {
                user_id,
                organization_id: event.organization_id,
                title: rendered.subject.clone(),
                message: rendered.body.clone(),
                notification_type: event.event_type.clone(),
                severity: event.severity.clone(),
                action_url: action_url.clone(),
                payload: payload.clone(),
            };
            match self.inbox.save(&entry).await {
                Ok(_) => created += 1,
                Err(e) => tracing::warn!(
                    user_id,
                    event_type = %event.event_type,
                    error = %e,
                    "Failed to store inbox notification"
                ),
            }
        }
        created
    }

    async fn org_settings(&self, event: &Event) -> Option<OrgSettings> {
        self.settings
            .get(event.organization_id)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(
                    organization_id = event.organization_id,
                    error = %e,
                    "Organization settings unavailable, applying no gating"
                );
                None
            })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
