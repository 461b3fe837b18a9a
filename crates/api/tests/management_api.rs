//! Integration tests for templates, preferences and the audit log.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, get, post_raw, send, SERVICE_TOKEN};
use serde_json::json;

#[tokio::test]
async fn upsert_then_list_templates() {
    let app = build_test_app();
    let body = json!({
        "event_type": "invoice.ready",
        "channel": "email",
        "subject": "Invoice {{ payload.number }}",
        "body": "Your invoice is ready."
    });

    let response = send(&app.router, Method::POST, "/api/v1/templates", &[], Some(body.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["channel"], "email");

    // Same key replaces the row.
    let mut changed = body;
    changed["body"] = json!("Updated.");
    send(&app.router, Method::POST, "/api/v1/templates", &[], Some(changed)).await;

    let json = body_json(get(&app.router, "/api/v1/templates?limit=10").await).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["body"], "Updated.");
}

#[tokio::test]
async fn template_validation_rejects_bad_input() {
    let app = build_test_app();
    for body in [
        json!({"event_type": "", "subject": "s", "body": "b"}),
        json!({"event_type": "a.b", "channel": "fax", "subject": "s", "body": "b"}),
        json!({"event_type": "a.b", "subject": " ", "body": "b"}),
    ] {
        let response = send(&app.router, Method::POST, "/api/v1/templates", &[], Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn stored_template_drives_delivery() {
    let app = build_test_app();
    send(
        &app.router,
        Method::POST,
        "/api/v1/templates",
        &[],
        Some(json!({
            "event_type": "invoice.ready",
            "channel": "email",
            "subject": "Invoice",
            "body": "Invoice {{ payload.number }} is ready"
        })),
    )
    .await;

    post_raw(
        &app.router,
        "/api/v1/events",
        &[("X-Service-Token", SERVICE_TOKEN)],
        r#"{"type":"invoice.ready","organization_id":3,"payload":{"number":"A-17"}}"#,
    )
    .await;

    let sent = app.transport.sent.lock().unwrap().clone();
    assert_eq!(
        sent,
        vec![(
            "email".to_string(),
            "ops@example.com: Invoice A-17 is ready".to_string()
        )]
    );
}

#[tokio::test]
async fn preferences_list_and_update() {
    let app = build_test_app();
    let id = app
        .store
        .add_preference(1, None, "payment.failed", "email", "a@example.com", "");
    app.store
        .add_preference(2, None, "payment.failed", "slack", "https://hooks/2", "");

    let json = body_json(get(&app.router, "/api/v1/preferences?organization_id=1").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);

    let response = send(
        &app.router,
        Method::PUT,
        &format!("/api/v1/preferences/{id}"),
        &[],
        Some(json!({
            "organization_id": 1,
            "event_type": "payment.failed",
            "channel": "slack",
            "target": "https://hooks/1",
            "enabled": false,
            "severity_min": "high"
        })),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["id"], id);
    assert_eq!(json["data"]["channel"], "slack");
    assert_eq!(json["data"]["enabled"], false);
}

#[tokio::test]
async fn preference_update_validates_and_reports_missing_rows() {
    let app = build_test_app();
    let valid = json!({
        "organization_id": 1,
        "event_type": "payment.failed",
        "channel": "email",
        "target": "a@example.com"
    });

    let response = send(&app.router, Method::PUT, "/api/v1/preferences/999", &[], Some(valid.clone())).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let mut bad_channel = valid.clone();
    bad_channel["channel"] = json!("sms");
    let response = send(&app.router, Method::PUT, "/api/v1/preferences/1", &[], Some(bad_channel)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut bad_severity = valid;
    bad_severity["severity_min"] = json!("extreme");
    let response = send(&app.router, Method::PUT, "/api/v1/preferences/1", &[], Some(bad_severity)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn logs_are_filtered() {
    let app = build_test_app();
    for body in [
        r#"{"type":"payment.failed","organization_id":1}"#,
        r#"{"type":"payment.success","organization_id":1}"#,
        r#"{"type":"payment.failed","organization_id":2}"#,
    ] {
        post_raw(&app.router, "/api/v1/events", &[("X-Service-Token", SERVICE_TOKEN)], body).await;
    }

    let json = body_json(get(&app.router, "/api/v1/logs?organization_id=1&event_type=payment.failed").await).await;
    let rows = json["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["channel"], "email");
    assert_eq!(rows[0]["status"], "success");
    assert_eq!(rows[0]["payload"]["event_type"], "payment.failed");

    let json = body_json(get(&app.router, "/api/v1/logs?limit=2").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 2);
}
