// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Extension, Router,
};
use tower_http::trace::TraceLayer;

use crate::domain::services::CrawlOrchestrator;
use crate::presentation::handlers::{cache_handler, health_handler, scrape_handler};

/// 创建应用路由
///
/// # 返回值
///
/// 返回未绑定状态的路由
pub fn routes() -> Router {
    let public_routes = Router::new()
        .route("/health", get(health_handler::health_check))
        .route("/v1/version", get(version));

    let api_routes = Router::new()
        .route("/api/v1/scrape", post(scrape_handler::scrape))
        .route("/api/v1/stats", get(health_handler::stats))
        .route("/api/v1/cache", delete(cache_handler::clear_cache));

    Router::new().merge(public_routes).merge(api_routes)
}

/// 创建绑定编排器的完整应用
///
/// # 参数
///
/// * `orchestrator` - 所有处理器共享的抓取编排器
pub fn create_router(orchestrator: Arc<CrawlOrchestrator>) -> Router {
    routes()
        .layer(Extension(orchestrator))
        .layer(TraceLayer::new_for_http())
}

/// 版本信息端点
///
/// # 返回值
///
/// 返回应用版本号
pub async fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
