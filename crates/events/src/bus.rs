//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] carries raw message bytes exactly as a queue transport
//! delivered them; decoding happens in the consumer so a malformed message
//! is dropped at the same place regardless of where it came from. Share it
//! via `Arc<EventBus>`.

use std::sync::Arc;

use tokio::sync::broadcast;

/// One undecoded message.
pub type RawMessage = Arc<[u8]>;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out bus for raw event messages.
///
/// ```rust
/// use herald_events::bus::EventBus;
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(br#"{"event_type":"payment.success"}"#.to_vec());
/// ```
pub struct EventBus {
    sender: broadcast::Sender<RawMessage>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full the oldest messages are dropped and slow
    /// receivers observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish a message to all current subscribers.
    ///
    /// Returns the number of subscribers that will see it; with none the
    /// message is dropped.
    pub fn publish(&self, message: impl Into<RawMessage>) -> usize {
        self.sender.send(message.into()).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RawMessage> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
