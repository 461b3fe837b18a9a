//! Well-known delivery channel name constants.
//!
//! These must match the values stored in `notification_preferences.channel`,
//! `notification_templates.channel` and `notification_logs.channel`.

/// Email delivered via SMTP. Targets hold one or more comma-separated
/// addresses.
pub const CHANNEL_EMAIL: &str = "email";

/// Chat message posted to a Slack-compatible incoming webhook.
pub const CHANNEL_SLACK: &str = "slack";

/// Structured JSON POST to an arbitrary HTTP endpoint.
pub const CHANNEL_WEBHOOK: &str = "webhook";

/// Base channel used when resolving the channel-agnostic template that
/// feeds in-app inbox entries.
pub const CHANNEL_BASE: &str = "";

/// All outbound channels a preference may target.
pub const OUTBOUND_CHANNELS: &[&str] = &[CHANNEL_EMAIL, CHANNEL_SLACK, CHANNEL_WEBHOOK];
