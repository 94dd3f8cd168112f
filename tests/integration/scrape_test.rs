// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::http::StatusCode;
use serde_json::json;
use tower::util::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::helpers::{create_test_app, json_body, post_json};

async fn serve_page(server: &MockServer, route: &str, html: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html.to_string(), "text/html"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn homepage_email_is_returned_without_further_crawling() {
    let server = MockServer::start().await;
    serve_page(
        &server,
        "/",
        r#"<html><body><footer>Write to <a href="mailto:owner@gmail.com">us</a></footer></body></html>"#,
    )
    .await;
    let app = create_test_app(&["gmail.com"]).await;

    let response = app
        .router
        .oneshot(post_json(
            "/api/v1/scrape",
            json!({"url": server.uri(), "max_pages": 10, "timeout": 20}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["domain"], "127.0.0.1");
    assert_eq!(body["pages_visited"], json!(["/"]));
    assert_eq!(body["total_pages"], 1);
    assert_eq!(body["emails"][0]["email"], "owner@gmail.com");
    assert_eq!(body["emails"][0]["found_on"], "/");
    assert_eq!(body["emails"][0]["mx_records"][0]["exchange"], "mail.gmail.com");

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[tokio::test]
async fn contact_page_email_is_found() {
    let server = MockServer::start().await;
    serve_page(&server, "/", "<html><body><h1>Welcome</h1></body></html>").await;
    serve_page(
        &server,
        "/contact",
        "<html><body><p>Sales: sales [at] yahoo [dot] com</p></body></html>",
    )
    .await;
    let app = create_test_app(&["yahoo.com"]).await;

    let response = app
        .router
        .oneshot(post_json(
            "/api/v1/scrape",
            json!({"url": server.uri(), "max_pages": 5, "timeout": 20}),
        ))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    let pages: Vec<&str> = body["pages_visited"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert_eq!(pages[0], "/");
    assert!(pages.contains(&"/contact"));
    assert_eq!(body["total_pages"], pages.len());
    assert_eq!(body["emails"].as_array().unwrap().len(), 1);
    assert_eq!(body["emails"][0]["email"], "sales@yahoo.com");
    assert_eq!(body["emails"][0]["found_on"], "/contact");
}

#[tokio::test]
async fn sitemap_links_are_followed() {
    let server = MockServer::start().await;
    serve_page(&server, "/", "<html><body>Hello</body></html>").await;
    let sitemap = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
        <urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
          <url><loc>{}/people/leadership</loc></url>
        </urlset>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/sitemap.xml"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(sitemap, "application/xml"))
        .mount(&server)
        .await;
    serve_page(
        &server,
        "/people/leadership",
        "<p>CEO: ceo@outlook.com</p>",
    )
    .await;
    let app = create_test_app(&["outlook.com"]).await;

    let response = app
        .router
        .oneshot(post_json(
            "/api/v1/scrape",
            json!({"url": server.uri(), "max_pages": 2, "timeout": 20}),
        ))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["pages_visited"], json!(["/", "/people/leadership"]));
    assert_eq!(body["emails"][0]["found_on"], "/people/leadership");
}

#[tokio::test]
async fn repeated_dead_domain_needs_no_dns() {
    let server = MockServer::start().await;
    serve_page(&server, "/", "<p>admin@gmail.com</p>").await;
    let app = create_test_app(&[]).await;
    let request = json!({"url": server.uri(), "max_pages": 1, "timeout": 10});

    let first = json_body(
        app.router
            .clone()
            .oneshot(post_json("/api/v1/scrape", request.clone()))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(first["success"], false);
    assert_eq!(app.resolver.queries(), 1);

    let second = json_body(
        app.router
            .oneshot(post_json("/api/v1/scrape", request))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(second["success"], false);
    assert_eq!(app.resolver.queries(), 1);
}
