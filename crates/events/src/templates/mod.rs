//! Template resolution and rendering.
//!
//! [`TemplateResolver::resolve`] picks the template for an
//! `(event_type, channel)` pair in priority order:
//!
//! 1. the built-in [`catalog`] entry for the event type (any channel),
//! 2. a stored override from the [`TemplateStore`],
//! 3. a generic fallback that mentions only the event type.
//!
//! Store failures degrade to the fallback.

pub mod catalog;
pub mod renderer;

use std::sync::Arc;

pub use renderer::{Rendered, TemplateRenderer};

use crate::store::TemplateStore;

/// Fallback subject when nothing else matches.
pub const FALLBACK_SUBJECT: &str = "New notification";

/// Fallback body when nothing else matches.
pub const FALLBACK_BODY: &str = "You have a new update: {{ event.type }}.";

/// Where a resolved template came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSource {
    BuiltIn,
    Stored,
    Fallback,
}

/// Template sources ready for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    pub event_type: String,
    pub channel: String,
    pub subject: String,
    pub body: String,
    pub source: TemplateSource,
}

/// Resolves templates against the built-in catalog and a store.
pub struct TemplateResolver {
    store: Arc<dyn TemplateStore>,
}

impl TemplateResolver {
    pub fn new(store: Arc<dyn TemplateStore>) -> Self {
        Self { store }
    }

    pub async fn resolve(&self, event_type: &str, channel: &str) -> ResolvedTemplate {
        if let Some(built_in) = catalog::built_in(event_type) {
            return ResolvedTemplate {
                event_type: event_type.to_string(),
                channel: channel.to_string(),
                subject: built_in.subject.to_string(),
                body: built_in.body.to_string(),
                source: TemplateSource::BuiltIn,
            };
        }

        match self.store.find_by_event_and_channel(event_type, channel).await {
            Ok(Some(stored)) => {
                return ResolvedTemplate {
                    event_type: stored.event_type,
                    channel: stored.channel,
                    subject: stored.subject,
                    body: stored.body,
                    source: TemplateSource::Stored,
                };
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(event_type, channel, error = %e, "Template lookup failed");
            }
        }

        ResolvedTemplate {
            event_type: event_type.to_string(),
            channel: channel.to_string(),
            subject: FALLBACK_SUBJECT.to_string(),
            body: FALLBACK_BODY.to_string(),
            source: TemplateSource::Fallback,
        }
    }
}
