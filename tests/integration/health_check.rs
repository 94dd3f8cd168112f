// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use axum::http::StatusCode;
use tower::util::ServiceExt;

use super::helpers::{create_test_app, get, json_body};

/// 健康检查测试
///
/// 验证健康检查端点返回服务状态与缓存连通性
#[tokio::test]
async fn health_check_works() {
    let app = create_test_app(&[]).await;

    let response = app.router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["cache_enabled"], true);
    assert_eq!(body["cache_connected"], true);
}

#[tokio::test]
async fn version_endpoint_returns_package_version() {
    let app = create_test_app(&[]).await;

    let response = app.router.oneshot(get("/v1/version")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], env!("CARGO_PKG_VERSION").as_bytes());
}
