//! Integration tests for the `/api/v1/inbox` endpoints.

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, build_test_app, send};
use herald_db::models::user_notification::CreateUserNotification;
use herald_events::store::InboxStore;
use serde_json::json;

async fn seed(app: &common::TestApp, user_id: i64, organization_id: i64, title: &str) -> i64 {
    app.store
        .save(&CreateUserNotification {
            user_id,
            organization_id,
            title: title.into(),
            message: format!("{title} body"),
            notification_type: "payment.success".into(),
            severity: String::new(),
            action_url: None,
            payload: json!({}),
        })
        .await
        .unwrap()
        .id
}

#[tokio::test]
async fn caller_is_required() {
    let app = build_test_app();
    let response = send(&app.router, Method::GET, "/api/v1/inbox", &[], None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "missing user id");
}

#[tokio::test]
async fn list_returns_page_and_counts() {
    let app = build_test_app();
    seed(&app, 7, 1, "first").await;
    let second = seed(&app, 7, 1, "second").await;
    seed(&app, 7, 2, "other org").await;
    seed(&app, 8, 1, "someone else").await;
    app.store.mark_read(second, 7).await.unwrap();

    let response = send(&app.router, Method::GET, "/api/v1/inbox?organization_id=1", &[("X-User-Id", "7")], None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    assert_eq!(json["data"]["unread_count"], 1);
    assert_eq!(json["data"]["notifications"][0]["title"], "second");
    assert_eq!(json["data"]["notifications"][0]["type"], "payment.success");

    let response = send(
        &app.router,
        Method::GET,
        "/api/v1/inbox?user_id=7&unread_only=true",
        &[],
        None,
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 2);
    let titles: Vec<_> = json["data"]["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["other org", "first"]);
}

#[tokio::test]
async fn mark_read_is_scoped_to_owner() {
    let app = build_test_app();
    let id = seed(&app, 7, 1, "mine").await;

    let uri = format!("/api/v1/inbox/{id}/read");
    let response = send(&app.router, Method::PATCH, &uri, &[("X-User-Id", "8")], None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app.router, Method::PATCH, &uri, &[("X-User-Id", "7")], None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let row = &app.store.inbox_for(7)[0];
    assert!(row.read);
    assert!(row.read_at.is_some());
}

#[tokio::test]
async fn mark_all_read_reports_count() {
    let app = build_test_app();
    seed(&app, 7, 1, "a").await;
    seed(&app, 7, 2, "b").await;
    seed(&app, 8, 1, "c").await;

    let response = send(&app.router, Method::PATCH, "/api/v1/inbox/read-all", &[("X-User-Id", "7")], None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["marked_read"], 2);
    assert!(app.store.inbox_for(8).iter().all(|n| !n.read));
}

#[tokio::test]
async fn delete_removes_only_owned_row() {
    let app = build_test_app();
    let id = seed(&app, 7, 1, "gone").await;
    let uri = format!("/api/v1/inbox/{id}");

    let response = send(&app.router, Method::DELETE, &uri, &[("X-User-Id", "8")], None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app.router, Method::DELETE, &uri, &[("X-User-Id", "7")], None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(app.store.inbox_for(7).is_empty());
}
