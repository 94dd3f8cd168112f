// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::config::settings::ScraperSettings;
use crate::engines::browser_engine::BrowserEngine;
use crate::engines::reqwest_engine::ReqwestEngine;
use crate::engines::traits::{
    EngineError, FetchResult, PageFetcher, ScrapeRequest, ScrapeResponse, ScraperEngine,
};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// 引擎使用统计
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineStats {
    /// 成功次数
    pub successes: u64,
    /// 失败次数
    pub failures: u64,
    /// 平均响应时间（毫秒）
    pub avg_response_time_ms: u64,
}

/// 引擎路由器
///
/// 按支持分数从高到低依次尝试引擎，可重试的失败会回退到下一个引擎。
/// 同时实现 `PageFetcher`，把所有失败转换为 `success=false` 的结果。
pub struct EngineRouter {
    /// 引擎列表
    engines: Vec<Arc<dyn ScraperEngine>>,
    /// 引擎性能统计
    engine_stats: DashMap<&'static str, EngineStats>,
    /// 单页超时
    page_timeout: Duration,
    /// 页面抓取是否请求JS渲染
    js_rendering: bool,
}

impl EngineRouter {
    /// 创建新的引擎路由器
    ///
    /// # 参数
    ///
    /// * `engines` - 引擎列表
    /// * `page_timeout` - 单页超时
    /// * `js_rendering` - 页面抓取是否优先使用浏览器
    pub fn new(
        engines: Vec<Arc<dyn ScraperEngine>>,
        page_timeout: Duration,
        js_rendering: bool,
    ) -> Self {
        Self {
            engines,
            engine_stats: DashMap::new(),
            page_timeout,
            js_rendering,
        }
    }

    /// 按配置组装引擎：始终包含HTTP引擎，启用JS渲染时加入浏览器引擎
    pub fn from_settings(settings: &ScraperSettings) -> Result<Self, EngineError> {
        let page_timeout = settings.page_timeout();
        let mut engines: Vec<Arc<dyn ScraperEngine>> = vec![Arc::new(ReqwestEngine::new(
            &settings.user_agent,
            page_timeout,
        )?)];
        if settings.enable_js_rendering {
            engines.push(Arc::new(BrowserEngine::new(&settings.user_agent, page_timeout)));
        }
        Ok(Self::new(engines, page_timeout, settings.enable_js_rendering))
    }

    fn select_engines(&self, request: &ScrapeRequest) -> Vec<Arc<dyn ScraperEngine>> {
        let mut candidates: Vec<(u8, Arc<dyn ScraperEngine>)> = self
            .engines
            .iter()
            .map(|e| (e.support_score(request), e.clone()))
            .filter(|(score, _)| *score > 0)
            .collect();
        // stable: equal scores keep registration order
        candidates.sort_by(|a, b| b.0.cmp(&a.0));
        candidates.into_iter().map(|(_, e)| e).collect()
    }

    fn update_engine_stats(&self, engine_name: &'static str, success: bool, elapsed: Duration) {
        let mut stats = self.engine_stats.entry(engine_name).or_default();
        let total = stats.successes + stats.failures;
        let elapsed_ms = elapsed.as_millis() as u64;
        stats.avg_response_time_ms = (stats.avg_response_time_ms * total + elapsed_ms) / (total + 1);
        if success {
            stats.successes += 1;
        } else {
            stats.failures += 1;
        }
    }

    /// 路由抓取请求
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// * `Ok(ScrapeResponse)` - 首个成功引擎的响应
    /// * `Err(EngineError)` - 最后一个引擎的错误
    pub async fn route(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
        let candidates = self.select_engines(request);
        if candidates.is_empty() {
            warn!("No suitable engines available for request");
            return Err(EngineError::AllEnginesFailed);
        }

        let mut last_error = None;
        for engine in candidates {
            let engine_name = engine.name();
            let started = Instant::now();
            match engine.scrape(request).await {
                Ok(response) => {
                    self.update_engine_stats(engine_name, true, started.elapsed());
                    debug!(
                        engine = engine_name,
                        url = %request.url,
                        status = response.status_code,
                        "Engine succeeded"
                    );
                    return Ok(response);
                }
                Err(e) => {
                    self.update_engine_stats(engine_name, false, started.elapsed());
                    if e.is_retryable() {
                        debug!(engine = engine_name, error = %e, "Engine failed, trying next engine");
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or(EngineError::AllEnginesFailed))
    }

    /// 获取引擎统计信息
    pub fn engine_stats(&self) -> std::collections::HashMap<String, EngineStats> {
        self.engine_stats
            .iter()
            .map(|e| (e.key().to_string(), e.value().clone()))
            .collect()
    }

    async fn fetch_with(&self, url: &str, needs_js: bool) -> FetchResult {
        let request = ScrapeRequest::new(url, self.page_timeout).with_js(needs_js);
        match self.route(&request).await {
            Ok(response) if (200..300).contains(&response.status_code) => {
                FetchResult::ok(response.url, response.status_code, response.content)
            }
            Ok(response) => FetchResult::failed(
                url,
                response.status_code,
                EngineError::HttpStatus(response.status_code).to_string(),
            ),
            Err(e) => FetchResult::failed(url, 0, e.to_string()),
        }
    }
}

#[async_trait]
impl PageFetcher for EngineRouter {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.fetch_with(url, self.js_rendering).await
    }

    async fn fetch_plain(&self, url: &str) -> FetchResult {
        self.fetch_with(url, false).await
    }

    async fn init(&self) {
        if !self.js_rendering {
            return;
        }
        for engine in &self.engines {
            if let Err(e) = engine.warm_up().await {
                warn!(engine = engine.name(), error = %e, "Engine warm-up failed");
            }
        }
    }

    async fn shutdown(&self) {
        for (engine, stats) in self.engine_stats() {
            info!(
                engine = %engine,
                successes = stats.successes,
                failures = stats.failures,
                avg_response_time_ms = stats.avg_response_time_ms,
                "Engine statistics"
            );
        }
        for engine in &self.engines {
            engine.shutdown().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// 可控的测试引擎
    struct TestEngine {
        name: &'static str,
        js_only: bool,
        status: u16,
        fail: bool,
        calls: AtomicUsize,
    }

    impl TestEngine {
        fn new(name: &'static str, js_only: bool, status: u16, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                js_only,
                status,
                fail,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ScraperEngine for TestEngine {
        async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(EngineError::BrowserUnavailable("no chrome".into()));
            }
            Ok(ScrapeResponse {
                url: request.url.clone(),
                status_code: self.status,
                content: format!("<p>{}</p>", self.name),
                content_type: "text/html".into(),
                response_time_ms: 1,
            })
        }

        fn support_score(&self, request: &ScrapeRequest) -> u8 {
            match (self.js_only, request.needs_js) {
                (true, true) => 100,
                (true, false) => 0,
                (false, true) => 10,
                (false, false) => 100,
            }
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }

    #[tokio::test]
    async fn test_browser_failure_falls_back_to_http() {
        let browser = TestEngine::new("browser", true, 200, true);
        let http = TestEngine::new("http", false, 200, false);
        let engines: Vec<Arc<dyn ScraperEngine>> = vec![http.clone(), browser.clone()];
        let router = EngineRouter::new(engines, Duration::from_secs(5), true);

        let result = router.fetch("https://a.com/").await;
        assert!(result.success);
        assert_eq!(result.html, "<p>http</p>");
        assert_eq!(browser.calls.load(Ordering::SeqCst), 1);

        let stats = router.engine_stats();
        assert_eq!(stats["browser"].failures, 1);
        assert_eq!(stats["http"].successes, 1);
    }

    #[tokio::test]
    async fn test_plain_fetch_skips_browser() {
        let browser = TestEngine::new("browser", true, 200, false);
        let http = TestEngine::new("http", false, 200, false);
        let engines: Vec<Arc<dyn ScraperEngine>> = vec![browser.clone(), http];
        let router = EngineRouter::new(engines, Duration::from_secs(5), true);

        let result = router.fetch_plain("https://a.com/robots.txt").await;
        assert_eq!(result.html, "<p>http</p>");
        assert_eq!(browser.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_non_success_status_is_a_failed_fetch() {
        let http = TestEngine::new("http", false, 404, false);
        let engines: Vec<Arc<dyn ScraperEngine>> = vec![http];
        let router = EngineRouter::new(engines, Duration::from_secs(5), false);

        let result = router.fetch("https://a.com/missing").await;
        assert!(!result.success);
        assert_eq!(result.status_code, 404);
        assert_eq!(result.error.as_deref(), Some("HTTP error 404"));
        assert!(result.html.is_empty());
    }

    #[test]
    fn test_from_settings_registers_engines() {
        let mut settings = crate::config::settings::Settings::defaults().unwrap().scraper;
        settings.enable_js_rendering = false;
        let router = EngineRouter::from_settings(&settings).unwrap();
        assert_eq!(router.engines.len(), 1);

        settings.enable_js_rendering = true;
        let router = EngineRouter::from_settings(&settings).unwrap();
        let request = ScrapeRequest::new("https://a.com", Duration::from_secs(1)).with_js(true);
        let names: Vec<_> = router.select_engines(&request).iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["browser", "reqwest"]);
    }

    #[tokio::test]
    async fn test_no_engines_never_panics() {
        let router = EngineRouter::new(vec![], Duration::from_secs(5), false);
        let result = router.fetch("https://a.com").await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("All engines failed"));
    }
}
