//! Fallback delivery destinations.

/// Destinations used when an organization-wide event matches no
/// preference and carries no destinations of its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryDefaults {
    pub emails: Vec<String>,
    pub slack_webhook: String,
    pub webhook_url: String,
}

impl DeliveryDefaults {
    /// Load defaults from environment variables. Every variable is optional.
    ///
    /// | Variable                 | Format                              |
    /// |--------------------------|-------------------------------------|
    /// | `DEFAULT_ALERT_EMAILS`   | comma-separated, blanks dropped     |
    /// | `SLACK_DEFAULT_WEBHOOK`  | incoming-webhook URL                |
    /// | `WEBHOOK_DEFAULT_TARGET` | URL                                 |
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let trimmed = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();
        Self {
            emails: split_csv(&trimmed("DEFAULT_ALERT_EMAILS")),
            slack_webhook: trimmed("SLACK_DEFAULT_WEBHOOK"),
            webhook_url: trimmed("WEBHOOK_DEFAULT_TARGET"),
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping blanks.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
