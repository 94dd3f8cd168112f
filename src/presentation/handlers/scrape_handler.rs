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

use axum::extract::{Extension, Json};
use std::sync::Arc;
use tracing::info;
use validator::Validate;

use crate::{
    application::dto::scrape_request::ScrapeRequestDto,
    domain::{models::CrawlResult, services::CrawlOrchestrator},
    presentation::errors::AppError,
};

/// 抓取网站并返回已验证的邮箱
///
/// 抓取本身的失败（无效URL、超时等）以 `success=false` 的结果返回，
/// 只有请求校验失败会返回400
pub async fn scrape(
    Extension(orchestrator): Extension<Arc<CrawlOrchestrator>>,
    Json(payload): Json<ScrapeRequestDto>,
) -> Result<Json<CrawlResult>, AppError> {
    payload.validate()?;

    info!(
        url = %payload.url,
        max_pages = ?payload.max_pages,
        timeout = ?payload.timeout,
        "Scrape request received"
    );

    let request = orchestrator.request_for(payload.url, payload.max_pages, payload.timeout);
    let result = orchestrator.scrape(request).await;

    Ok(Json(result))
}
