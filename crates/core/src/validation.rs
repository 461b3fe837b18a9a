//! Input validation helpers for management endpoints.

use std::sync::LazyLock;

use regex::Regex;

use crate::channels::{CHANNEL_BASE, OUTBOUND_CHANNELS};
use crate::error::CoreError;
use crate::severity::Severity;

/// Dot-delimited namespace such as `payment.success` or `project.scan.completed`.
static EVENT_TYPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("event type pattern is valid")
});

/// Reject empty or whitespace-only values.
pub fn validate_not_blank(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

/// Validate an event type name.
pub fn validate_event_type(event_type: &str) -> Result<(), CoreError> {
    validate_not_blank("event_type", event_type)?;
    if EVENT_TYPE_RE.is_match(event_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid event_type: '{event_type}'. Expected dot-delimited segments, e.g. payment.success"
        )))
    }
}

/// Validate an outbound channel name.
pub fn validate_channel(channel: &str) -> Result<(), CoreError> {
    if OUTBOUND_CHANNELS.contains(&channel) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Unknown channel: '{channel}'. Valid channels: {}",
            OUTBOUND_CHANNELS.join(", ")
        )))
    }
}

/// Validate a template channel: an outbound channel or the empty base channel.
pub fn validate_template_channel(channel: &str) -> Result<(), CoreError> {
    if channel == CHANNEL_BASE {
        return Ok(());
    }
    validate_channel(channel)
}

/// Validate a preference's minimum severity. Empty means "no gate".
pub fn validate_severity_min(severity_min: &str) -> Result<(), CoreError> {
    if severity_min.trim().is_empty() {
        return Ok(());
    }
    severity_min.parse::<Severity>().map(|_| ())
}
