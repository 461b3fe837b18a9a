//! Event normalization.
//!
//! Producers evolved independently and disagree on envelope shape. Some
//! send the canonical `{"type", "organization_id", "payload", ...}` form,
//! others use `event_type`, nest their data under `data` or `data.payload`,
//! or put everything at the top level. [`normalize`] turns all of them into
//! one [`Event`].
//!
//! Decoding runs in two stages:
//!
//! 1. A strict decode into the canonical wire shape. Fields it leaves empty
//!    (`type`, `payload`) are backfilled from the free-form object.
//! 2. When the strict decode fails (wrong field types, bad timestamp), a
//!    loose extractor reads every field from the free-form object and also
//!    looks inside `data` for `emails` and `user_id`.
//!
//! Each backfilled field is driven by an ordered list of extraction
//! strategies; the first one that yields a value wins.

use chrono::{DateTime, Utc};
use herald_core::types::{DbId, Timestamp};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::NormalizeError;
use crate::event::Event;

type Object = Map<String, Value>;

/// Keys read for the event type, in priority order.
const EVENT_TYPE_KEYS: &[&str] = &["event_type", "type"];

/// Envelope keys stripped when the whole object becomes the payload.
const ENVELOPE_KEYS: &[&str] = &[
    "type",
    "event_type",
    "payload",
    "organization_id",
    "user_id",
    "severity",
    "emails",
    "slack_webhook",
    "webhook_url",
    "occurred_at",
];

/// Payload sources, in priority order. The last one always yields.
const PAYLOAD_STRATEGIES: &[PayloadStrategy] = &[
    nested_payload,
    nested_data_payload,
    data_object,
    envelope_remainder,
];

type PayloadStrategy = fn(&Object) -> Option<Object>;

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Decode raw message bytes into a canonical [`Event`].
///
/// Only bytes that are not a JSON object fail. An event that decodes with
/// an empty `event_type` is returned as-is; callers drop it.
pub fn normalize(raw: &[u8]) -> Result<Event, NormalizeError> {
    match serde_json::from_slice::<WireEvent>(raw) {
        Ok(wire) => {
            let payload_missing = wire.payload.is_none();
            let mut event = wire.into_event();
            if event.event_type.is_empty() || payload_missing {
                if let Ok(object) = parse_object(raw) {
                    backfill(&mut event, &object, payload_missing);
                }
            }
            Ok(event)
        }
        Err(strict_err) => {
            tracing::debug!(error = %strict_err, "Strict event decode failed, using loose extraction");
            let object = parse_object(raw)?;
            Ok(loose_event(&object))
        }
    }
}

fn parse_object(raw: &[u8]) -> Result<Object, NormalizeError> {
    match serde_json::from_slice::<Value>(raw)? {
        Value::Object(object) => Ok(object),
        _ => Err(NormalizeError::NotAnObject),
    }
}

// ---------------------------------------------------------------------------
// Strict shape
// ---------------------------------------------------------------------------

/// The canonical producer envelope.
#[derive(Debug, Deserialize)]
struct WireEvent {
    #[serde(rename = "type", default)]
    event_type: Option<String>,
    #[serde(default)]
    organization_id: Option<DbId>,
    #[serde(default)]
    user_id: Option<DbId>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(rename = "emails", default)]
    target_emails: Option<Vec<String>>,
    #[serde(default)]
    slack_webhook: Option<String>,
    #[serde(default)]
    webhook_url: Option<String>,
    #[serde(default)]
    payload: Option<Object>,
    #[serde(default)]
    occurred_at: Option<DateTime<Utc>>,
}

impl WireEvent {
    fn into_event(self) -> Event {
        Event {
            event_type: self.event_type.unwrap_or_default(),
            organization_id: self.organization_id.unwrap_or_default(),
            user_id: self.user_id,
            severity: self.severity.unwrap_or_default(),
            target_emails: self.target_emails.unwrap_or_default(),
            slack_webhook: self.slack_webhook.unwrap_or_default(),
            webhook_url: self.webhook_url.unwrap_or_default(),
            payload: self.payload.unwrap_or_default(),
            occurred_at: self.occurred_at.unwrap_or_else(Utc::now),
        }
    }
}

// ---------------------------------------------------------------------------
// Backfill and loose extraction
// ---------------------------------------------------------------------------

/// Fill empty canonical fields from the free-form object.
fn backfill(event: &mut Event, object: &Object, payload_missing: bool) {
    if event.event_type.is_empty() {
        event.event_type = first_string(object, EVENT_TYPE_KEYS).unwrap_or_default();
    }
    if event.organization_id == 0 {
        event.organization_id = object
            .get("organization_id")
            .and_then(numeric_id)
            .unwrap_or_default();
    }
    if event.severity.is_empty() {
        event.severity = string_field(object, "severity").unwrap_or_default();
    }
    if payload_missing {
        event.payload = extract_payload(object);
    }
}

/// Build an event entirely from the free-form object.
fn loose_event(object: &Object) -> Event {
    let data = object.get("data").and_then(Value::as_object);

    let mut event = Event::new("");
    backfill(&mut event, object, true);

    event.user_id = data
        .and_then(|d| d.get("user_id"))
        .or_else(|| object.get("user_id"))
        .and_then(lenient_id);
    event.target_emails = data
        .and_then(|d| d.get("emails"))
        .or_else(|| object.get("emails"))
        .map(email_list)
        .unwrap_or_default();
    event.slack_webhook = string_field(object, "slack_webhook").unwrap_or_default();
    event.webhook_url = string_field(object, "webhook_url").unwrap_or_default();
    event.occurred_at = object
        .get("occurred_at")
        .and_then(Value::as_str)
        .and_then(parse_timestamp)
        .unwrap_or(event.occurred_at);
    event
}

fn extract_payload(object: &Object) -> Object {
    PAYLOAD_STRATEGIES
        .iter()
        .find_map(|strategy| strategy(object))
        .unwrap_or_default()
}

fn nested_payload(object: &Object) -> Option<Object> {
    object.get("payload")?.as_object().cloned()
}

fn nested_data_payload(object: &Object) -> Option<Object> {
    object.get("data")?.get("payload")?.as_object().cloned()
}

fn data_object(object: &Object) -> Option<Object> {
    object.get("data")?.as_object().cloned()
}

fn envelope_remainder(object: &Object) -> Option<Object> {
    Some(
        object
            .iter()
            .filter(|(key, _)| !ENVELOPE_KEYS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    )
}

// ---------------------------------------------------------------------------
// Field coercion
// ---------------------------------------------------------------------------

fn string_field(object: &Object, key: &str) -> Option<String> {
    object
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn first_string(object: &Object, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| string_field(object, key))
}

/// Integer from a JSON number. Fractional values are truncated.
fn numeric_id(value: &Value) -> Option<DbId> {
    value.as_i64().or_else(|| value.as_f64().map(|f| f as DbId))
}

/// Like [`numeric_id`] but also accepts numeric strings.
fn lenient_id(value: &Value) -> Option<DbId> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            s.parse::<DbId>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().map(|f| f as DbId))
        }
        other => numeric_id(other),
    }
}

/// A single address or a list of addresses, trimmed with blanks dropped.
fn email_list(value: &Value) -> Vec<String> {
    let push = |out: &mut Vec<String>, s: &str| {
        let s = s.trim();
        if !s.is_empty() {
            out.push(s.to_string());
        }
    };
    let mut out = Vec::new();
    match value {
        Value::String(s) => push(&mut out, s),
        Value::Array(items) => {
            for item in items.iter().filter_map(Value::as_str) {
                push(&mut out, item);
            }
        }
        _ => {}
    }
    out
}

fn parse_timestamp(s: &str) -> Option<Timestamp> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use serde_json::json;

    use super::*;

    fn bytes(value: Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn strict_shape_decodes_directly() {
        let raw = br#"{"type":"payment.success","organization_id":1,"payload":{"a":1},"severity":"high"}"#;
        let event = normalize(raw).unwrap();
        assert_eq!(event.event_type, "payment.success");
        assert_eq!(event.organization_id, 1);
        assert_eq!(event.severity, "high");
        assert_eq!(Value::Object(event.payload), json!({"a": 1}));
    }

    #[test]
    fn event_type_key_backfills_and_strips_envelope() {
        let raw = br#"{"event_type":"sbom.scan.completed","organization_id":2,"severity":"medium","foo":"bar"}"#;
        let event = normalize(raw).unwrap();
        assert_eq!(event.event_type, "sbom.scan.completed");
        assert_eq!(event.organization_id, 2);
        assert_eq!(event.severity, "medium");
        assert_eq!(Value::Object(event.payload), json!({"foo": "bar"}));
    }

    #[test]
    fn malformed_bytes_are_a_parse_error() {
        assert_matches!(normalize(b"{bad"), Err(NormalizeError::Json(_)));
    }

    #[test]
    fn non_object_is_a_parse_error() {
        assert_matches!(normalize(b"[1,2,3]"), Err(NormalizeError::NotAnObject));
        assert_matches!(normalize(b"\"payment.success\""), Err(NormalizeError::NotAnObject));
    }

    #[test]
    fn event_type_prefers_event_type_over_type() {
        let raw = bytes(json!({"event_type": "project.scan.failed", "payload": {}}));
        let event = normalize(&raw).unwrap();
        assert_eq!(event.event_type, "project.scan.failed");
    }

    #[test]
    fn payload_falls_back_to_data_payload_then_data() {
        let nested = bytes(json!({
            "type": "project.scan.completed",
            "data": {"payload": {"project": "api"}, "other": 1}
        }));
        assert_eq!(
            Value::Object(normalize(&nested).unwrap().payload),
            json!({"project": "api"})
        );

        let data_only = bytes(json!({"type": "project.scan.completed", "data": {"vulns": 3}}));
        assert_eq!(
            Value::Object(normalize(&data_only).unwrap().payload),
            json!({"vulns": 3})
        );
    }

    #[test]
    fn null_payload_is_not_carried_into_remainder() {
        let raw = br#"{"type":"payment.success","payload":null,"data":5}"#;
        let event = normalize(raw).unwrap();
        assert_eq!(Value::Object(event.payload), json!({"data": 5}));
    }

    #[test]
    fn missing_type_is_not_an_error() {
        let event = normalize(br#"{"organization_id":5,"payload":{"x":1}}"#).unwrap();
        assert!(event.is_noop());
        assert_eq!(event.organization_id, 5);
    }

    #[test]
    fn strict_fields_survive_backfill() {
        let raw = bytes(json!({
            "event_type": "payment.failed",
            "organization_id": 4,
            "user_id": 12,
            "emails": ["billing@example.com"],
            "webhook_url": "https://hooks.example.com/x",
            "occurred_at": "2026-01-02T03:04:05Z",
            "amount": 99
        }));
        let event = normalize(&raw).unwrap();
        assert_eq!(event.user_id, Some(12));
        assert_eq!(event.target_emails, vec!["billing@example.com"]);
        assert_eq!(event.webhook_url, "https://hooks.example.com/x");
        assert_eq!(event.occurred_at.to_rfc3339(), "2026-01-02T03:04:05+00:00");
        assert_eq!(Value::Object(event.payload), json!({"amount": 99}));
    }

    #[test]
    fn loose_path_reads_user_and_emails_from_data() {
        // A fractional organization id breaks the strict decode.
        let raw = bytes(json!({
            "type": "vulnerability.assignment",
            "organization_id": 7.0,
            "severity": "critical",
            "data": {"user_id": "42", "emails": " dev@example.com ", "project": "core"}
        }));
        let event = normalize(&raw).unwrap();
        assert_eq!(event.event_type, "vulnerability.assignment");
        assert_eq!(event.organization_id, 7);
        assert_eq!(event.user_id, Some(42));
        assert_eq!(event.target_emails, vec!["dev@example.com"]);
        assert_eq!(event.payload["project"], "core");
    }

    #[test]
    fn loose_path_accepts_float_user_and_email_list() {
        let raw = bytes(json!({
            "event_type": "code_finding.assignment",
            "organization_id": "not-a-number",
            "data": {"user_id": 8.0, "emails": ["a@example.com", "", "b@example.com"]}
        }));
        let event = normalize(&raw).unwrap();
        assert_eq!(event.organization_id, 0);
        assert_eq!(event.user_id, Some(8));
        assert_eq!(event.target_emails, vec!["a@example.com", "b@example.com"]);
    }

    #[test]
    fn missing_occurred_at_defaults_to_now() {
        let before = Utc::now();
        let event = normalize(br#"{"type":"payment.success"}"#).unwrap();
        assert!(event.occurred_at >= before);
    }
}
