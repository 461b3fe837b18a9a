//! Subject/body rendering with `minijinja`.
//!
//! The context has two branches: `event.*` (type, organization_id, user_id,
//! severity, occurred_at) and `payload.*` (the event payload). Missing keys
//! render as empty text. A field that fails to render falls back to its
//! unrendered source so delivery always proceeds.

use minijinja::{context, Environment, UndefinedBehavior, Value};

use crate::event::Event;
use crate::templates::ResolvedTemplate;

/// A rendered subject/body pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub subject: String,
    pub body: String,
}

/// Stateless renderer over a shared template environment.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        Self { env }
    }

    /// Build the rendering context for an event.
    pub fn context(event: &Event) -> Value {
        context! {
            event => event.context_view(),
            payload => &event.payload,
        }
    }

    /// Render both fields of a template against `ctx`.
    pub fn render(&self, template: &ResolvedTemplate, ctx: &Value) -> Rendered {
        Rendered {
            subject: self.render_field("subject", &template.subject, ctx),
            body: self.render_field("body", &template.body, ctx),
        }
    }

    fn render_field(&self, field: &'static str, source: &str, ctx: &Value) -> String {
        match self.env.render_str(source, ctx) {
            Ok(rendered) => rendered,
            Err(e) => {
                tracing::warn!(field, error = %e, "Template render failed, using source text");
                source.to_string()
            }
        }
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::templates::TemplateSource;

    fn template(subject: &str, body: &str) -> ResolvedTemplate {
        ResolvedTemplate {
            event_type: "payment.success".into(),
            channel: String::new(),
            subject: subject.into(),
            body: body.into(),
            source: TemplateSource::Stored,
        }
    }

    fn event() -> Event {
        Event::new("payment.success")
            .with_organization(3)
            .with_severity("high")
            .with_payload(json!({"plan_name": "Pro", "amount": 49}))
    }

    #[test]
    fn renders_event_and_payload_branches() {
        let renderer = TemplateRenderer::new();
        let ctx = TemplateRenderer::context(&event());
        let out = renderer.render(
            &template(
                "{{ event.type }} for org {{ event.organization_id }}",
                "{{ payload.plan_name }} paid {{ payload.amount }} ({{ event.severity }})",
            ),
            &ctx,
        );
        assert_eq!(out.subject, "payment.success for org 3");
        assert_eq!(out.body, "Pro paid 49 (high)");
    }

    #[test]
    fn missing_keys_render_empty() {
        let renderer = TemplateRenderer::new();
        let ctx = TemplateRenderer::context(&event());
        let out = renderer.render(&template("[{{ payload.nope }}]", "{{ payload.a.b.c }}x"), &ctx);
        assert_eq!(out.subject, "[]");
        assert_eq!(out.body, "x");
    }

    #[test]
    fn syntax_error_falls_back_per_field() {
        let renderer = TemplateRenderer::new();
        let ctx = TemplateRenderer::context(&event());
        let out = renderer.render(&template("{{ broken", "Plan {{ payload.plan_name }}"), &ctx);
        assert_eq!(out.subject, "{{ broken");
        assert_eq!(out.body, "Plan Pro");
    }

    #[test]
    fn rendering_is_idempotent() {
        let renderer = TemplateRenderer::new();
        let ctx = TemplateRenderer::context(&event());
        let tpl = template("{{ event.type }}", "{{ payload.amount }} at {{ event.occurred_at }}");
        assert_eq!(renderer.render(&tpl, &ctx), renderer.render(&tpl, &ctx));
    }
}
