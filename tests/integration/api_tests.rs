// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use serde_json::json;
use tower::util::ServiceExt;

use super::helpers::{create_test_app, delete, get, json_body, post_json};

#[tokio::test]
async fn scrape_rejects_out_of_range_parameters() {
    let app = create_test_app(&[]).await;

    for body in [
        json!({"url": "https://acme.com", "max_pages": 0}),
        json!({"url": "https://acme.com", "max_pages": 101}),
        json!({"url": "https://acme.com", "timeout": 4}),
        json!({"url": ""}),
    ] {
        let response = app
            .router
            .clone()
            .oneshot(post_json("/api/v1/scrape", body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", body);
        let payload = json_body(response).await;
        assert_eq!(payload["success"], false);
    }
}

#[tokio::test]
async fn scrape_reports_invalid_url_in_result() {
    let app = create_test_app(&[]).await;

    let response = app
        .router
        .oneshot(post_json("/api/v1/scrape", json!({"url": "invalid-url"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid URL"));
    assert!(body["execution_time"].is_number());
    assert_eq!(body["pages_visited"], json!([]));
}

#[tokio::test]
async fn stats_counts_namespace_keys() {
    let app = create_test_app(&[]).await;
    let cache = app.orchestrator.cache();
    cache.set_mx_status("acme.com", false, &[]).await;
    cache.mark_invalid("acme.com").await;

    let response = app.router.oneshot(get("/api/v1/stats")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["cache_enabled"], true);
    assert_eq!(body["cache_connected"], true);
    assert_eq!(body["cache_keys"], 2);
}

#[tokio::test]
async fn cache_can_be_cleared_per_domain() {
    let app = create_test_app(&[]).await;
    let cache = app.orchestrator.cache();
    cache.mark_invalid("acme.com").await;
    cache.mark_invalid("other.com").await;

    let response = app
        .router
        .clone()
        .oneshot(delete("/api/v1/cache?domain=acme.com"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["scope"], "domain");
    assert_eq!(body["removed"], 1);
    assert!(!cache.is_marked_invalid("acme.com").await);
    assert!(cache.is_marked_invalid("other.com").await);

    let response = app
        .router
        .oneshot(delete("/api/v1/cache"))
        .await
        .unwrap();
    let body = json_body(response).await;
    assert_eq!(body["scope"], "namespace");
    assert_eq!(body["removed"], 1);
    assert!(app.backend.is_empty());
}

#[tokio::test]
async fn cache_flush_all() {
    let app = create_test_app(&[]).await;
    app.orchestrator.cache().mark_invalid("acme.com").await;

    let response = app
        .router
        .oneshot(delete("/api/v1/cache?all=true"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["scope"], "all");
    assert_eq!(body["removed"], serde_json::Value::Null);
    assert!(app.backend.is_empty());
}
