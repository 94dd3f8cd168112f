// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::extract::{Extension, Json, Query};
use std::sync::Arc;
use tracing::info;

use crate::{
    application::dto::{scrape_request::CacheClearQuery, scrape_response::CacheClearResponseDto},
    domain::services::CrawlOrchestrator,
    presentation::errors::AppError,
};

/// 清理MX缓存
///
/// `all=true` 清空整个缓存数据库；指定 `domain` 只清理该域名；
/// 否则清理命名空间下的全部键
pub async fn clear_cache(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator>>,
    Query(query): Query<CacheClearQuery>,
) -> Result<Json<CacheClearResponseDto>, AppError> {
    let cache = orchestrator.cache();

    if query.all {
        cache.flush_all().await?;
        info!("Cache flushed on request");
        return Ok(Json(CacheClearResponseDto {
            success: true,
            scope: "all".to_string(),
            removed: None,
        }));
    }

    let domain = query
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty());
    let removed = cache.clear(domain).await?;
    let scope = if domain.is_some() { "domain" } else { "namespace" };

    Ok(Json(CacheClearResponseDto {
        success: true,
        scope: scope.to_string(),
        removed: Some(removed),
    }))
}
