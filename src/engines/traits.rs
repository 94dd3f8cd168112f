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

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// 引擎错误类型
#[derive(Error, Debug)]
pub enum EngineError {
    /// 请求失败
    #[error("Request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    /// 服务器返回非成功状态码
    #[error("HTTP error {0}")]
    HttpStatus(u16),
    /// 浏览器不可用
    #[error("Browser unavailable: {0}")]
    BrowserUnavailable(String),
    /// 所有引擎都失败
    #[error("All engines failed")]
    AllEnginesFailed,
    /// 超时
    #[error("Timeout")]
    Timeout,
    /// 其他错误
    #[error("Other error: {0}")]
    Other(String),
}

impl EngineError {
    /// 判断失败后是否应尝试下一个引擎
    ///
    /// # 返回值
    ///
    /// 服务器已明确应答的状态码错误不再回退，其余错误均回退
    pub fn is_retryable(&self) -> bool {
        !matches!(self, EngineError::HttpStatus(_))
    }
}

/// 抓取请求
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    /// 目标URL
    pub url: String,
    /// 超时时间
    pub timeout: Duration,
    /// 是否需要JavaScript渲染
    pub needs_js: bool,
}

impl ScrapeRequest {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
            needs_js: false,
        }
    }

    pub fn with_js(mut self, needs_js: bool) -> Self {
        self.needs_js = needs_js;
        self
    }
}

/// 抓取响应
#[derive(Debug, Clone)]
pub struct ScrapeResponse {
    /// 跟随重定向后的最终URL
    pub url: String,
    /// HTTP状态码
    pub status_code: u16,
    /// 响应内容
    pub content: String,
    /// 内容类型
    pub content_type: String,
    /// 响应时间（毫秒）
    pub response_time_ms: u64,
}

/// 抓取引擎特质
#[async_trait]
pub trait ScraperEngine: Send + Sync {
    /// 执行抓取
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError>;

    /// 计算对请求的支持分数（0-100），0表示不支持
    fn support_score(&self, request: &ScrapeRequest) -> u8;

    /// 引擎名称
    fn name(&self) -> &'static str;

    /// 预热引擎资源
    async fn warm_up(&self) -> Result<(), EngineError> {
        Ok(())
    }

    /// 释放引擎资源
    async fn shutdown(&self) {}
}

/// 单页抓取结果
///
/// 抓取失败通过 `success=false` 表示，不会以错误形式返回
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResult {
    pub url: String,
    pub html: String,
    pub success: bool,
    pub status_code: u16,
    pub error: Option<String>,
}

impl FetchResult {
    pub fn ok(url: impl Into<String>, status_code: u16, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            success: true,
            status_code,
            error: None,
        }
    }

    pub fn failed(url: impl Into<String>, status_code: u16, error: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: String::new(),
            success: false,
            status_code,
            error: Some(error.into()),
        }
    }
}

/// 页面抓取接口
///
/// 编排器与链接发现器只依赖此接口
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// 抓取页面，可能经过浏览器渲染
    async fn fetch(&self, url: &str) -> FetchResult;

    /// 仅使用HTTP抓取（sitemap、robots.txt等非HTML资源）
    async fn fetch_plain(&self, url: &str) -> FetchResult {
        self.fetch(url).await
    }

    /// 初始化共享资源
    async fn init(&self) {}

    /// 释放共享资源
    async fn shutdown(&self) {}
}
