//! Target resolution: who hears about an event, and where.
//!
//! Outbound targets come from enabled preferences that pass the severity
//! gate. An organization-wide event with no matching preference falls back
//! to the event's own destinations, then to the configured
//! [`DeliveryDefaults`]. A user-scoped event never falls back, so a user
//! without preferences does not trigger an organization broadcast.
//!
//! Inbox recipients are resolved independently: the targeted user, or an
//! organization broadcast whose audience depends on the event namespace.

use std::fmt;
use std::sync::Arc;

use herald_core::channels::{CHANNEL_EMAIL, CHANNEL_SLACK, CHANNEL_WEBHOOK};
use herald_core::roles::DEFAULT_SCAN_ROLE;
use herald_core::severity::should_notify;
use herald_core::types::DbId;
use herald_db::models::org_settings::OrgSettings;

use crate::config::DeliveryDefaults;
use crate::event::Event;
use crate::store::{OrgUserDirectory, PreferenceStore};

// ---------------------------------------------------------------------------
// Channel and target
// ---------------------------------------------------------------------------

/// An outbound delivery channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Email,
    Slack,
    Webhook,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => CHANNEL_EMAIL,
            Self::Slack => CHANNEL_SLACK,
            Self::Webhook => CHANNEL_WEBHOOK,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            CHANNEL_EMAIL => Some(Self::Email),
            CHANNEL_SLACK => Some(Self::Slack),
            CHANNEL_WEBHOOK => Some(Self::Webhook),
            _ => None,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One place to deliver a rendered message.
///
/// `channel` keeps the stored name so preferences naming a channel this
/// build does not know still count as resolved; the dispatcher skips them.
/// Email targets hold comma-joined addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryTarget {
    pub channel: String,
    pub target: String,
}

impl DeliveryTarget {
    pub fn new(channel: Channel, target: impl Into<String>) -> Self {
        Self {
            channel: channel.as_str().to_string(),
            target: target.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Org settings gating
// ---------------------------------------------------------------------------

/// Organization toggle that silences an event namespace, if any applies.
fn muted_by(event_type: &str, settings: &OrgSettings) -> Option<&'static str> {
    if event_type.starts_with("vulnerability.") && !settings.vulnerability_alerts {
        Some("vulnerability_alerts")
    } else if event_type.starts_with("report.weekly") && !settings.weekly_reports {
        Some("weekly_reports")
    } else if event_type.starts_with("user.") && !settings.user_activity_alerts {
        Some("user_activity_alerts")
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Inbox audience
// ---------------------------------------------------------------------------

/// Who receives an organization-wide inbox broadcast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxAudience {
    AllMembers,
    Role(String),
}

impl InboxAudience {
    /// Audience for an event without a target user.
    ///
    /// `payment.*` reaches everyone; `project.scan.*` and `sbom.scan.*`
    /// reach the `target_role` named in the payload, else developers; any
    /// other namespace reaches everyone.
    pub fn for_event(event: &Event) -> Self {
        let event_type = event.event_type.as_str();
        if event_type.starts_with("payment.") {
            Self::AllMembers
        } else if event_type.starts_with("project.scan.") || event_type.starts_with("sbom.scan.") {
            let role = event
                .payload_str("target_role")
                .filter(|role| !role.is_empty())
                .unwrap_or(DEFAULT_SCAN_ROLE);
            Self::Role(role.to_string())
        } else {
            Self::AllMembers
        }
    }
}

// ---------------------------------------------------------------------------
// TargetResolver
// ---------------------------------------------------------------------------

pub struct TargetResolver {
    preferences: Arc<dyn PreferenceStore>,
    directory: Arc<dyn OrgUserDirectory>,
    defaults: DeliveryDefaults,
}

impl TargetResolver {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        directory: Arc<dyn OrgUserDirectory>,
        defaults: DeliveryDefaults,
    ) -> Self {
        Self {
            preferences,
            directory,
            defaults,
        }
    }

    /// Outbound targets for an event.
    ///
    /// `settings` is the organization's stored row, if it has one. Only a
    /// stored `false` toggle gates a namespace or the email channel; `None`
    /// applies no gating. An empty result means nothing to dispatch.
    pub async fn resolve_targets(
        &self,
        event: &Event,
        settings: Option<&OrgSettings>,
    ) -> Vec<DeliveryTarget> {
        if let Some(toggle) = settings.and_then(|s| muted_by(&event.event_type, s)) {
            tracing::debug!(
                event_type = %event.event_type,
                organization_id = event.organization_id,
                toggle,
                "Event muted by organization settings"
            );
            return Vec::new();
        }

        let mut targets = self.preference_targets(event).await;
        if targets.is_empty() && event.target_user().is_none() {
            targets = self.fallback_targets(event);
        }

        if settings.is_some_and(|s| !s.email_notifications) {
            targets.retain(|t| t.channel != CHANNEL_EMAIL);
        }
        targets
    }

    /// Users who get an inbox entry for this event.
    ///
    /// Directory failures are logged and yield no recipients.
    pub async fn resolve_inbox_recipients(&self, event: &Event) -> Vec<DbId> {
        if let Some(user_id) = event.target_user() {
            return vec![user_id];
        }
        if event.organization_id == 0 {
            return Vec::new();
        }

        let org = event.organization_id;
        let result = match InboxAudience::for_event(event) {
            InboxAudience::AllMembers => self.directory.list_user_ids(org).await,
            InboxAudience::Role(role) => self.directory.list_user_ids_by_role(org, &role).await,
        };
        result.unwrap_or_else(|e| {
            tracing::warn!(
                event_type = %event.event_type,
                organization_id = org,
                error = %e,
                "Cannot load organization users for inbox broadcast"
            );
            Vec::new()
        })
    }

    async fn preference_targets(&self, event: &Event) -> Vec<DeliveryTarget> {
        let preferences = self
            .preferences
            .list(event.organization_id, event.target_user(), &event.event_type)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(event_type = %event.event_type, error = %e, "Preference lookup failed");
                Vec::new()
            });

        preferences
            .into_iter()
            .filter(|p| p.enabled)
            .filter(|p| should_notify(&p.severity_min, &event.severity))
            .map(|p| DeliveryTarget {
                channel: p.channel,
                target: p.target,
            })
            .collect()
    }

    /// Per channel: the event's destination, else the configured default.
    fn fallback_targets(&self, event: &Event) -> Vec<DeliveryTarget> {
        let mut targets = Vec::new();

        let emails = if event.target_emails.is_empty() {
            &self.defaults.emails
        } else {
            &event.target_emails
        };
        if !emails.is_empty() {
            targets.push(DeliveryTarget::new(Channel::Email, emails.join(",")));
        }

        let slack = first_non_empty(&event.slack_webhook, &self.defaults.slack_webhook);
        if !slack.is_empty() {
            targets.push(DeliveryTarget::new(Channel::Slack, slack));
        }

        let webhook = first_non_empty(&event.webhook_url, &self.defaults.webhook_url);
        if !webhook.is_empty() {
            targets.push(DeliveryTarget::new(Channel::Webhook, webhook));
        }

        targets
    }
}

fn first_non_empty<'a>(preferred: &'a str, fallback: &'a str) -> &'a str {
    if preferred.is_empty() {
        fallback
    } else {
        preferred
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use serde_json::json;

    use super::*;
    use crate::testing::{org_settings, MemoryStore};

    fn defaults() -> DeliveryDefaults {
        DeliveryDefaults {
            emails: vec!["ops@example.com".into(), "sec@example.com".into()],
            slack_webhook: "https://hooks.slack.test/default".into(),
            webhook_url: "https://example.com/default".into(),
        }
    }

    fn resolver(store: &Arc<MemoryStore>, defaults: DeliveryDefaults) -> TargetResolver {
        TargetResolver::new(store.clone(), store.clone(), defaults)
    }

    #[tokio::test]
    async fn enabled_preferences_map_to_targets() {
        let store = Arc::new(MemoryStore::default());
        store.add_preference(1, None, "payment.failed", "email", "billing@example.com", "");
        store.add_preference(1, None, "payment.failed", "slack", "https://hooks/1", "");
        store.add_preference(1, None, "payment.success", "slack", "https://hooks/other", "");
        store.preferences.lock().unwrap()[1].enabled = false;

        let event = Event::new("payment.failed").with_organization(1);
        let targets = resolver(&store, defaults()).resolve_targets(&event, None).await;
        assert_eq!(targets, vec![DeliveryTarget::new(Channel::Email, "billing@example.com")]);
    }

    #[tokio::test]
    async fn severity_gate_filters_preferences() {
        let store = Arc::new(MemoryStore::default());
        store.add_preference(1, None, "vulnerability.found", "slack", "https://hooks/high", "high");
        store.add_preference(1, None, "vulnerability.found", "email", "a@example.com", "low");

        let event = Event::new("vulnerability.found")
            .with_organization(1)
            .with_severity("medium");
        let targets = resolver(&store, DeliveryDefaults::default())
            .resolve_targets(&event, None)
            .await;
        assert_eq!(targets, vec![DeliveryTarget::new(Channel::Email, "a@example.com")]);
    }

    #[tokio::test]
    async fn user_scoped_event_never_falls_back() {
        let store = Arc::new(MemoryStore::default());
        let event = Event::new("payment.failed")
            .with_organization(1)
            .with_user(42)
            .with_target_emails(["user@example.com"]);
        let targets = resolver(&store, defaults()).resolve_targets(&event, None).await;
        assert!(targets.is_empty());
    }

    #[tokio::test]
    async fn org_event_falls_back_to_one_target_per_default_channel() {
        let store = Arc::new(MemoryStore::default());
        let event = Event::new("payment.failed").with_organization(1);
        let targets = resolver(&store, defaults()).resolve_targets(&event, None).await;
        assert_eq!(
            targets,
            vec![
                DeliveryTarget::new(Channel::Email, "ops@example.com,sec@example.com"),
                DeliveryTarget::new(Channel::Slack, "https://hooks.slack.test/default"),
                DeliveryTarget::new(Channel::Webhook, "https://example.com/default"),
            ]
        );
    }

    #[tokio::test]
    async fn event_destinations_override_defaults_per_channel() {
        let store = Arc::new(MemoryStore::default());
        let partial = DeliveryDefaults {
            slack_webhook: String::new(),
            ..defaults()
        };
        let event = Event::new("payment.failed")
            .with_organization(1)
            .with_target_emails(["cfo@example.com"])
            .with_webhook_url("https://example.com/event");
        let targets = resolver(&store, partial).resolve_targets(&event, None).await;
        assert_eq!(
            targets,
            vec![
                DeliveryTarget::new(Channel::Email, "cfo@example.com"),
                DeliveryTarget::new(Channel::Webhook, "https://example.com/event"),
            ]
        );
    }

    #[tokio::test]
    async fn no_defaults_means_no_targets() {
        let store = Arc::new(MemoryStore::default());
        let event = Event::new("payment.failed").with_organization(1);
        let targets = resolver(&store, DeliveryDefaults::default())
            .resolve_targets(&event, None)
            .await;
        assert!(targets.is_empty());
    }

    #[tokio::test]
    async fn preference_failure_degrades_to_fallback() {
        let store = Arc::new(MemoryStore::default());
        store.fail_preferences.store(true, Ordering::SeqCst);
        let event = Event::new("payment.failed").with_organization(1);
        let targets = resolver(&store, defaults()).resolve_targets(&event, None).await;
        assert_eq!(targets.len(), 3);
    }

    #[tokio::test]
    async fn unknown_preference_channel_still_counts_as_resolved() {
        let store = Arc::new(MemoryStore::default());
        store.add_preference(1, None, "payment.failed", "sms", "+15550100", "");
        let event = Event::new("payment.failed").with_organization(1);
        let targets = resolver(&store, defaults()).resolve_targets(&event, None).await;
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].channel, "sms");
    }

    #[tokio::test]
    async fn muted_namespace_resolves_nothing() {
        let store = Arc::new(MemoryStore::default());
        store.add_preference(1, None, "vulnerability.found", "slack", "https://hooks/1", "");
        let settings = OrgSettings {
            vulnerability_alerts: false,
            user_activity_alerts: false,
            ..org_settings(1)
        };
        let resolver = resolver(&store, defaults());

        let event = Event::new("vulnerability.found").with_organization(1);
        assert!(resolver.resolve_targets(&event, Some(&settings)).await.is_empty());

        let event = Event::new("user.invited").with_organization(1);
        assert!(resolver.resolve_targets(&event, Some(&settings)).await.is_empty());

        let event = Event::new("payment.failed").with_organization(1);
        assert_eq!(resolver.resolve_targets(&event, Some(&settings)).await.len(), 3);
    }

    #[tokio::test]
    async fn user_namespace_delivers_without_a_settings_row() {
        let store = Arc::new(MemoryStore::default());
        store.add_preference(1, None, "user.invited", "slack", "https://hooks/users", "");
        let resolver = resolver(&store, defaults());

        let event = Event::new("user.invited").with_organization(1);
        assert_eq!(
            resolver.resolve_targets(&event, None).await,
            vec![DeliveryTarget::new(Channel::Slack, "https://hooks/users")]
        );

        // A stored row with every toggle on gates nothing either.
        assert_eq!(
            resolver
                .resolve_targets(&event, Some(&org_settings(1)))
                .await
                .len(),
            1
        );
    }

    #[tokio::test]
    async fn org_wide_user_event_falls_back_without_a_settings_row() {
        let store = Arc::new(MemoryStore::default());
        let event = Event::new("user.joined").with_organization(1);
        let targets = resolver(&store, defaults()).resolve_targets(&event, None).await;
        assert_eq!(targets.len(), 3);
    }

    #[tokio::test]
    async fn email_toggle_strips_email_targets_only() {
        let store = Arc::new(MemoryStore::default());
        let settings = OrgSettings {
            email_notifications: false,
            ..org_settings(1)
        };
        let event = Event::new("payment.failed").with_organization(1);
        let targets = resolver(&store, defaults())
            .resolve_targets(&event, Some(&settings))
            .await;
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|t| t.channel != CHANNEL_EMAIL));
    }

    #[tokio::test]
    async fn inbox_targets_user_directly() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(1, 10, "developer");
        let event = Event::new("payment.failed").with_organization(1).with_user(77);
        assert_eq!(
            resolver(&store, defaults()).resolve_inbox_recipients(&event).await,
            vec![77]
        );
    }

    #[tokio::test]
    async fn scan_broadcast_defaults_to_developers() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(1, 10, "developer");
        store.add_user(1, 11, "admin");
        store.add_user(1, 12, "developer");
        store.add_user(2, 13, "developer");
        let resolver = resolver(&store, defaults());

        let event = Event::new("project.scan.completed").with_organization(1);
        assert_eq!(resolver.resolve_inbox_recipients(&event).await, vec![10, 12]);

        let event = Event::new("sbom.scan.failed")
            .with_organization(1)
            .with_payload(json!({"target_role": "admin"}));
        assert_eq!(resolver.resolve_inbox_recipients(&event).await, vec![11]);
    }

    #[tokio::test]
    async fn payment_and_other_namespaces_reach_everyone() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(1, 10, "developer");
        store.add_user(1, 11, "admin");
        let resolver = resolver(&store, defaults());

        for event_type in ["payment.success", "report.weekly"] {
            let event = Event::new(event_type).with_organization(1);
            assert_eq!(resolver.resolve_inbox_recipients(&event).await, vec![10, 11]);
        }
    }

    #[tokio::test]
    async fn inbox_without_org_or_user_is_empty() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(0, 10, "developer");
        let event = Event::new("payment.success");
        assert!(resolver(&store, defaults())
            .resolve_inbox_recipients(&event)
            .await
            .is_empty());
    }

    #[tokio::test]
    async fn directory_failure_yields_no_recipients() {
        let store = Arc::new(MemoryStore::default());
        store.add_user(1, 10, "developer");
        store.fail_directory.store(true, Ordering::SeqCst);
        let event = Event::new("payment.success").with_organization(1);
        assert!(resolver(&store, defaults())
            .resolve_inbox_recipients(&event)
            .await
            .is_empty());
    }

    #[test]
    fn audience_ignores_blank_target_role() {
        let event = Event::new("project.scan.summary").with_payload(json!({"target_role": ""}));
        assert_eq!(
            InboxAudience::for_event(&event),
            InboxAudience::Role("developer".into())
        );
    }
}
