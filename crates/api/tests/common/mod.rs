//! Shared fixtures for API integration tests: the router over in-memory
//! stores and request helpers. No database is required.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use herald_api::config::{LogFormat, ServerConfig};
use herald_api::router::build_app_router;
use herald_api::state::AppState;
use herald_events::{DeliveryDefaults, DeliveryMetrics, Engine, EngineParts, OrgSettingsCache};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

pub use herald_events::testing::{MemoryStore, RecordingTransport};

pub const SERVICE_TOKEN: &str = "s3cret";

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

pub fn test_config(service_token: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: String::new(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        service_token: service_token.to_string(),
        org_settings_ttl: Duration::from_secs(300),
        log_format: LogFormat::Text,
        email: None,
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub transport: Arc<RecordingTransport>,
    pub metrics: Arc<DeliveryMetrics>,
    pub router: Router,
}

/// Full router over in-memory stores with a running engine.
pub fn build_test_app() -> TestApp {
    build(true, SERVICE_TOKEN)
}

/// Full router without an engine, as when transports failed to build.
pub fn build_app_without_engine() -> TestApp {
    build(false, SERVICE_TOKEN)
}

pub fn build(with_engine: bool, service_token: &str) -> TestApp {
    let store = Arc::new(MemoryStore::default());
    let transport = Arc::new(RecordingTransport::default());
    let metrics = Arc::new(DeliveryMetrics::new());
    let config = test_config(service_token);

    let engine = with_engine.then(|| {
        Arc::new(Engine::new(EngineParts {
            templates: store.clone(),
            preferences: store.clone(),
            logs: store.clone(),
            inbox: store.clone(),
            directory: store.clone(),
            settings: Arc::new(OrgSettingsCache::new(store.clone(), config.org_settings_ttl)),
            email: transport.clone(),
            chat: transport.clone(),
            webhook: transport.clone(),
            metrics: Some(metrics.clone()),
            defaults: DeliveryDefaults {
                emails: vec!["ops@example.com".into()],
                ..DeliveryDefaults::default()
            },
        }))
    });

    let state = AppState {
        config: Arc::new(config.clone()),
        engine,
        templates: store.clone(),
        preferences: store.clone(),
        logs: store.clone(),
        inbox: store.clone(),
        metrics: metrics.clone(),
        pool: None,
    };

    TestApp {
        router: build_app_router(state, &config),
        store,
        transport,
        metrics,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, &[], None).await
}

pub async fn post_raw(
    app: &Router,
    uri: &str,
    headers: &[(&str, &str)],
    body: &str,
) -> Response<Body> {
    let mut builder = Request::builder().method(Method::POST).uri(uri);
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let request = builder
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response.into_body().collect().await.unwrap().to_bytes().to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}
