//! Herald event routing and delivery.
//!
//! - [`normalize`](normalize::normalize) turns any producer envelope into an
//!   [`Event`].
//! - [`Engine`] runs one event through inbox fan-out, target resolution,
//!   template rendering, dispatch and audit logging.
//! - [`EventBus`] and [`EventConsumer`] feed queue messages to the engine.
//! - [`delivery`] holds the email, chat and webhook transports.
//! - [`store`] declares the persistence seams; [`PgStore`] implements them
//!   over `herald-db`.

pub mod bus;
pub mod config;
pub mod consumer;
pub mod delivery;
pub mod dispatcher;
pub mod engine;
pub mod error;
pub mod event;
pub mod metrics;
pub mod normalize;
pub mod pg;
pub mod routing;
pub mod settings_cache;
pub mod store;
pub mod templates;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use bus::EventBus;
pub use config::DeliveryDefaults;
pub use consumer::{EventConsumer, MessageSource};
pub use engine::{Engine, EngineParts, HandleOutcome};
pub use error::{EngineError, NormalizeError, StoreError};
pub use event::Event;
pub use metrics::{DeliveryMetrics, MetricsSink};
pub use pg::PgStore;
pub use settings_cache::OrgSettingsCache;
