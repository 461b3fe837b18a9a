//! Bus consumption loop.
//!
//! [`EventConsumer`] pulls one message at a time from a [`MessageSource`],
//! normalizes it and awaits [`Engine::handle_event`] before reading the
//! next, so processing is sequential per source. Cancellation is checked
//! only while waiting for a message; an event already being handled runs
//! to completion.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::bus::RawMessage;
use crate::engine::Engine;
use crate::error::SourceError;
use crate::normalize::normalize;

/// Pause after a failed read before trying again.
const READ_RETRY_DELAY: Duration = Duration::from_secs(1);

/// A stream of raw event messages.
#[async_trait]
pub trait MessageSource: Send {
    /// Next message, or `None` once the source is exhausted.
    async fn next_message(&mut self) -> Result<Option<RawMessage>, SourceError>;
}

/// Adapts a bus subscription. Lag is logged and skipped over.
#[async_trait]
impl MessageSource for broadcast::Receiver<RawMessage> {
    async fn next_message(&mut self) -> Result<Option<RawMessage>, SourceError> {
        loop {
            match self.recv().await {
                Ok(message) => return Ok(Some(message)),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Event consumer lagged, messages dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return Ok(None),
            }
        }
    }
}

/// Counters for one consumer run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumerStats {
    pub handled: u64,
    pub malformed: u64,
    pub ignored: u64,
    pub read_errors: u64,
}

pub struct EventConsumer {
    engine: Arc<Engine>,
    cancel: CancellationToken,
}

impl EventConsumer {
    pub fn new(engine: Arc<Engine>, cancel: CancellationToken) -> Self {
        Self { engine, cancel }
    }

    /// Run until the source is exhausted or the token is cancelled.
    pub async fn run<S: MessageSource>(self, mut source: S) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        tracing::info!("Event consumer started");

        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::info!("Event consumer cancelled");
                    break;
                }
                next = source.next_message() => next,
            };

            let raw = match next {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    tracing::info!("Message source closed, event consumer shutting down");
                    break;
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read event message");
                    stats.read_errors += 1;
                    tokio::time::sleep(READ_RETRY_DELAY).await;
                    continue;
                }
            };

            let event = match normalize(&raw) {
                Ok(event) => event,
                Err(e) => {
                    tracing::warn!(error = %e, bytes = raw.len(), "Dropping malformed event message");
                    stats.malformed += 1;
                    continue;
                }
            };

            if event.is_noop() {
                tracing::debug!("Dropping event message without a type");
                stats.ignored += 1;
                continue;
            }

            self.engine.handle_event(&event).await;
            stats.handled += 1;
        }

        stats
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
