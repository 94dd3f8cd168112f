// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json};
use std::sync::Arc;

use crate::{
    application::dto::scrape_response::{HealthResponseDto, StatsResponseDto},
    domain::services::CrawlOrchestrator,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 健康检查端点
///
/// # 返回值
///
/// 服务状态与缓存连通性
pub async fn health_check(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator>>,
) -> Json<HealthResponseDto> {
    let cache = orchestrator.cache();
    Json(HealthResponseDto {
        status: "healthy".to_string(),
        version: VERSION.to_string(),
        cache_enabled: cache.is_enabled(),
        cache_connected: cache.is_connected().await,
    })
}

/// 运行统计端点
pub async fn stats(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator>>,
) -> Json<StatsResponseDto> {
    let cache = orchestrator.cache();
    let cache_connected = cache.is_connected().await;
    let cache_keys = if cache_connected {
        cache.key_count().await
    } else {
        None
    };

    Json(StatsResponseDto {
        version: VERSION.to_string(),
        cache_enabled: cache.is_enabled(),
        cache_connected,
        cache_keys,
    })
}
