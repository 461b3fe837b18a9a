//! Per-target dispatch and audit logging.
//!
//! Every resolved target is handled on its own: resolve and render the
//! channel template, call the channel sender, record the outcome in the
//! metrics sink and append one audit row. A failing target never stops
//! the ones after it, and nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use herald_core::status::{STATUS_FAILED, STATUS_SUCCESS};
use herald_db::models::notification_log::CreateNotificationLog;
use minijinja::Value as TemplateContext;

use crate::config::split_csv;
use crate::delivery::{ChatSender, DeliveryError, EmailSender, WebhookSender};
use crate::event::Event;
use crate::metrics::MetricsSink;
use crate::routing::{Channel, DeliveryTarget};
use crate::store::NotificationLogStore;
use crate::templates::{Rendered, TemplateRenderer, TemplateResolver};

/// Tally of one event's dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub sent: usize,
    pub failed: usize,
    /// Targets on a channel this service cannot deliver to.
    pub skipped: usize,
}

pub struct Dispatcher {
    templates: Arc<TemplateResolver>,
    renderer: Arc<TemplateRenderer>,
    email: Arc<dyn EmailSender>,
    chat: Arc<dyn ChatSender>,
    webhook: Arc<dyn WebhookSender>,
    logs: Arc<dyn NotificationLogStore>,
    metrics: Option<Arc<dyn MetricsSink>>,
}

impl Dispatcher {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        templates: Arc<TemplateResolver>,
        renderer: Arc<TemplateRenderer>,
        email: Arc<dyn EmailSender>,
        chat: Arc<dyn ChatSender>,
        webhook: Arc<dyn WebhookSender>,
        logs: Arc<dyn NotificationLogStore>,
        metrics: Option<Arc<dyn MetricsSink>>,
    ) -> Self {
        Self {
            templates,
            renderer,
            email,
            chat,
            webhook,
            logs,
            metrics,
        }
    }

    /// Deliver `event` to every target, in order.
    pub async fn dispatch(
        &self,
        event: &Event,
        targets: &[DeliveryTarget],
        ctx: &TemplateContext,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for target in targets {
            let Some(channel) = Channel::parse(&target.channel) else {
                tracing::warn!(
                    event_type = %event.event_type,
                    channel = %target.channel,
                    "Skipping target on unsupported channel"
                );
                summary.skipped += 1;
                continue;
            };

            let template = self
                .templates
                .resolve(&event.event_type, channel.as_str())
                .await;
            let rendered = self.renderer.render(&template, ctx);

            let started = Instant::now();
            let result = self.send(channel, event, &target.target, &rendered).await;
            let elapsed = started.elapsed();

            let status = match &result {
                Ok(()) => {
                    tracing::info!(
                        event_type = %event.event_type,
                        channel = %channel,
                        target = %target.target,
                        "Notification dispatched"
                    );
                    summary.sent += 1;
                    STATUS_SUCCESS
                }
                Err(e) => {
                    tracing::warn!(
                        event_type = %event.event_type,
                        channel = %channel,
                        error = %e,
                        "Notification send failed"
                    );
                    summary.failed += 1;
                    STATUS_FAILED
                }
            };

            if let Some(metrics) = &self.metrics {
                metrics.observe_send(channel.as_str(), status, elapsed);
            }

            self.log_attempt(event, target, status, result.err()).await;
        }

        summary
    }

    async fn send(
        &self,
        channel: Channel,
        event: &Event,
        target: &str,
        rendered: &Rendered,
    ) -> Result<(), DeliveryError> {
        match channel {
            Channel::Email => {
                let recipients = split_csv(target);
                self.email
                    .send_email(&recipients, &rendered.subject, &rendered.body)
                    .await
            }
            Channel::Slack => self.chat.send_chat_message(target, &rendered.body).await,
            Channel::Webhook => {
                let payload = serde_json::json!({
                    "event": event,
                    "rendered_subject": rendered.subject,
                    "rendered_body": rendered.body,
                });
                self.webhook.send_webhook(target, &payload).await
            }
        }
    }

    async fn log_attempt(
        &self,
        event: &Event,
        target: &DeliveryTarget,
        status: &str,
        error: Option<DeliveryError>,
    ) {
        let entry = CreateNotificationLog {
            organization_id: event.organization_id,
            user_id: event.target_user(),
            event_type: event.event_type.clone(),
            channel: target.channel.clone(),
            target: target.target.clone(),
            status: status.to_string(),
            error: error.map(|e| e.to_string()),
            payload: event.audit_payload(),
        };
        if let Err(e) = self.logs.insert(&entry).await {
            tracing::warn!(
                event_type = %event.event_type,
                channel = %target.channel,
                error = %e,
                "Failed to write notification log"
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
