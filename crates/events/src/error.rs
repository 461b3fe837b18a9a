//! Error types for event ingestion and store access.
//!
//! Delivery failures live next to the transports in
//! [`delivery`](crate::delivery).

/// The inbound bytes could not be turned into an [`Event`](crate::Event).
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    /// The payload is not valid JSON.
    #[error("Malformed event payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The payload is valid JSON but its top level is not an object.
    #[error("Event payload must be a JSON object")]
    NotAnObject,
}

/// A store or directory lookup failed.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backing store is not reachable or not wired in this process.
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Failure surfaced by raw-bytes ingestion.
///
/// Once an event is normalized nothing aborts its handling, so parsing is
/// the only failure this carries.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// A message source could not produce its next message.
///
/// Transient by definition: the consumer logs it and reads again.
#[derive(Debug, thiserror::Error)]
#[error("Message source read failed: {0}")]
pub struct SourceError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_error_display_not_an_object() {
        assert_eq!(
            NormalizeError::NotAnObject.to_string(),
            "Event payload must be a JSON object"
        );
    }

    #[test]
    fn engine_error_is_transparent() {
        let err: EngineError = NormalizeError::NotAnObject.into();
        assert_eq!(err.to_string(), "Event payload must be a JSON object");
    }

    #[test]
    fn store_error_display_unavailable() {
        let err = StoreError::Unavailable("directory offline".to_string());
        assert_eq!(err.to_string(), "Store unavailable: directory offline");
    }
}
