// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::allow_list::{email_domain, is_acceptable};
use super::email_extractor::EmailExtractor;
use super::link_discoverer::{LinkDiscoverer, CONTACT_PAGES};
use super::mx_validator::MxValidator;
use crate::config::settings::ScraperSettings;
use crate::domain::models::crawl::FOUND_ON_MULTIPLE;
use crate::domain::models::{CrawlRequest, CrawlResult, DiscoveredLink, EmailFinding};
use crate::engines::traits::{FetchResult, PageFetcher};
use crate::infrastructure::cache::MxCache;
use crate::infrastructure::metrics::{
    CRAWLS_TOTAL, CRAWL_EMAILS_FOUND_TOTAL, CRAWL_PAGES_FETCHED_TOTAL,
};
use crate::utils::errors::ScraperError;
use crate::utils::url_utils::{
    base_url, build_url, extract_root_domain, normalize, normalize_for_dedup, page_path,
};

/// 抓取状态机的阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlPhase {
    Init,
    RootFetch,
    RootExtract,
    Discover,
    BuildQueue,
    BatchFetch,
    ExtractAll,
    ValidateAll,
    Done,
}

/// 单次抓取的累积状态
///
/// 由编排器独占，超时或异常时已累积的内容仍会输出
#[derive(Debug)]
struct CrawlState {
    phase: CrawlPhase,
    domain: Option<String>,
    pages_visited: Vec<String>,
    visited: HashSet<String>,
    emails: Vec<EmailFinding>,
    reported: HashSet<String>,
    candidates: Vec<String>,
    candidate_set: HashSet<String>,
    found_valid_email: bool,
    known_invalid: bool,
    out_of_time: bool,
}

impl CrawlState {
    fn new() -> Self {
        Self {
            phase: CrawlPhase::Init,
            domain: None,
            pages_visited: Vec::new(),
            visited: HashSet::new(),
            emails: Vec::new(),
            reported: HashSet::new(),
            candidates: Vec::new(),
            candidate_set: HashSet::new(),
            found_valid_email: false,
            known_invalid: false,
            out_of_time: false,
        }
    }

    fn enter(&mut self, phase: CrawlPhase) {
        if self.phase != phase {
            debug!(from = ?self.phase, to = ?phase, "Crawl phase transition");
            self.phase = phase;
        }
    }

    fn record_visit(&mut self, path: String) {
        if self.visited.insert(path.clone()) {
            self.pages_visited.push(path);
        }
    }

    fn add_candidates(&mut self, candidates: Vec<String>) {
        for candidate in candidates {
            if self.candidate_set.insert(candidate.clone()) {
                self.candidates.push(candidate);
            }
        }
    }

    fn into_result(self, execution_time_seconds: f64) -> CrawlResult {
        let total_pages = self.pages_visited.len();
        CrawlResult {
            success: self.known_invalid || !self.emails.is_empty(),
            domain: self.domain,
            emails: self.emails,
            pages_visited: self.pages_visited,
            total_pages,
            execution_time_seconds,
            error: None,
        }
    }
}

/// 抓取的最终状态
enum CrawlOutcome {
    Completed,
    Failed(ScraperError),
}

/// 构建抓取队列
///
/// 发现的链接优先（保持排序），最多 `max_pages - 1` 个位置，
/// 剩余位置依次由常见联系页路径填充；跳过首页与重复URL
///
/// # 参数
///
/// * `base` - 站点基础URL
/// * `links` - 已排序的候选链接
/// * `max_pages` - 最大访问页数，包含首页
///
/// # 返回值
///
/// 待抓取的绝对URL
pub fn build_queue(base: &str, links: &[DiscoveredLink], max_pages: usize) -> Vec<String> {
    let slots = max_pages.saturating_sub(1);
    let mut seen = HashSet::new();
    if let Ok(root) = normalize_for_dedup(base) {
        seen.insert(root);
    }

    let fallback = CONTACT_PAGES.iter().map(|path| build_url(base, path));
    let mut queue = Vec::with_capacity(slots);

    for url in links.iter().map(|l| l.url.clone()).chain(fallback) {
        if queue.len() >= slots {
            break;
        }
        let key = normalize_for_dedup(&url).unwrap_or_else(|_| url.clone());
        if seen.insert(key) {
            queue.push(url);
        }
    }

    queue
}

/// 抓取编排器
///
/// 驱动 首页抓取 → 链接发现 → 分批抓取 → 提取 → 验证 的完整流程。
/// 所有协作者失败都在此转换为中性结果，`scrape` 从不返回错误
pub struct CrawlOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    extractor: Arc<EmailExtractor>,
    discoverer: LinkDiscoverer,
    validator: MxValidator,
    settings: ScraperSettings,
}

impl CrawlOrchestrator {
    /// 创建编排器
    ///
    /// # 参数
    ///
    /// * `fetcher` - 页面获取器，同时用于链接发现
    /// * `validator` - MX验证服务
    /// * `settings` - 抓取配置
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        validator: MxValidator,
        settings: ScraperSettings,
    ) -> Self {
        Self {
            discoverer: LinkDiscoverer::new(fetcher.clone()),
            extractor: Arc::new(EmailExtractor::new()),
            fetcher,
            validator,
            settings,
        }
    }

    pub fn cache(&self) -> &MxCache {
        self.validator.cache()
    }

    pub fn settings(&self) -> &ScraperSettings {
        &self.settings
    }

    /// 使用配置中的默认值补全请求
    pub fn request_for(
        &self,
        url: impl Into<String>,
        max_pages: Option<usize>,
        timeout_seconds: Option<u64>,
    ) -> CrawlRequest {
        CrawlRequest::new(url)
            .with_max_pages(max_pages.unwrap_or(self.settings.max_pages_to_visit))
            .with_timeout(timeout_seconds.unwrap_or(self.settings.default_timeout))
    }

    /// 预热页面获取器
    pub async fn init(&self) {
        self.fetcher.init().await;
        info!(
            js_rendering = self.settings.enable_js_rendering,
            strategies = ?self.extractor.strategy_names(),
            cache_enabled = self.cache().is_enabled(),
            "Crawl orchestrator initialized"
        );
    }

    /// 释放页面获取器持有的资源
    pub async fn shutdown(&self) {
        self.fetcher.shutdown().await;
        info!("Crawl orchestrator shut down");
    }

    /// 执行一次抓取
    ///
    /// # 参数
    ///
    /// * `request` - 抓取请求
    ///
    /// # 返回值
    ///
    /// 抓取结果；输入URL无效或内部异常时 `success=false` 且 `error` 有值
    pub async fn scrape(&self, request: CrawlRequest) -> CrawlResult {
        let crawl_id = Uuid::new_v4();
        let span = info_span!("crawl", crawl_id = %crawl_id, url = %request.url);
        self.run(request).instrument(span).await
    }

    async fn run(&self, request: CrawlRequest) -> CrawlResult {
        let started = Instant::now();
        let budget = Duration::from_secs(request.timeout_seconds);
        let mut state = CrawlState::new();

        let execution = AssertUnwindSafe(self.execute(&request, &mut state, started, budget))
            .catch_unwind();
        let outcome = match execution.await {
            Ok(Ok(())) => CrawlOutcome::Completed,
            Ok(Err(e)) => CrawlOutcome::Failed(e),
            Err(panic) => {
                let reason = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "crawl task panicked".to_string());
                CrawlOutcome::Failed(ScraperError::Internal(reason))
            }
        };

        let out_of_time = state.out_of_time;
        let elapsed = started.elapsed().as_secs_f64();
        let mut result = state.into_result(elapsed);

        let label = match &outcome {
            CrawlOutcome::Failed(_) => "error",
            CrawlOutcome::Completed if out_of_time => "timeout",
            CrawlOutcome::Completed if result.success => "success",
            CrawlOutcome::Completed => "empty",
        };
        metrics::counter!(CRAWLS_TOTAL, "outcome" => label).increment(1);

        match outcome {
            CrawlOutcome::Failed(e) => {
                warn!(error = %e, fatal = e.is_fatal(), "Crawl aborted");
                result.success = false;
                result.error = Some(e.to_string());
            }
            CrawlOutcome::Completed if out_of_time => {
                warn!(
                    timeout_seconds = budget.as_secs(),
                    pages = result.total_pages,
                    "Crawl ran out of time, returning partial result"
                );
            }
            CrawlOutcome::Completed => {}
        }

        info!(
            success = result.success,
            emails = result.emails.len(),
            pages = result.total_pages,
            elapsed_seconds = elapsed,
            "Crawl finished"
        );
        result
    }

    async fn execute(
        &self,
        request: &CrawlRequest,
        state: &mut CrawlState,
        started: Instant,
        budget: Duration,
    ) -> Result<(), ScraperError> {
        state.enter(CrawlPhase::Init);
        let normalized = normalize(&request.url)?;
        let root_domain = extract_root_domain(&normalized)?;
        let base = base_url(&normalized)?;
        state.domain = Some(root_domain.clone());

        if self.cache().is_marked_invalid(&root_domain).await {
            info!(domain = %root_domain, "Domain known to have no mail servers, skipping crawl");
            state.known_invalid = true;
            state.enter(CrawlPhase::Done);
            return Ok(());
        }

        state.enter(CrawlPhase::RootFetch);
        state.record_visit("/".to_string());
        let root_limit =
            budget + Duration::from_secs(self.settings.timeout_grace_seconds);
        let root = match tokio::time::timeout(root_limit, self.fetcher.fetch(&base)).await {
            Ok(root) => root,
            Err(_) => {
                state.out_of_time = true;
                FetchResult::failed(&base, 0, "homepage fetch exceeded the crawl time limit")
            }
        };
        metrics::counter!(CRAWL_PAGES_FETCHED_TOTAL).increment(1);

        let mut homepage_html = None;
        if root.success {
            state.enter(CrawlPhase::RootExtract);
            let candidates = self.extract(root.html.clone(), &base).await;
            let found = self
                .validate_candidates(state, &candidates, "/", &root_domain)
                .await;
            state.add_candidates(candidates);
            if found {
                info!(domain = %root_domain, "Valid email found on homepage");
                state.enter(CrawlPhase::Done);
                return Ok(());
            }
            homepage_html = Some(root.html);
        } else {
            let err = ScraperError::Fetch {
                url: base.clone(),
                reason: root.error.unwrap_or_default(),
            };
            warn!(error = %err, "Homepage fetch failed");
        }

        if started.elapsed() < budget {
            state.enter(CrawlPhase::Discover);
            let remaining = budget.saturating_sub(started.elapsed());
            let links = match tokio::time::timeout(
                remaining,
                self.discoverer
                    .discover(&base, &root_domain, homepage_html.as_deref()),
            )
            .await
            {
                Ok(links) => links,
                Err(_) => {
                    warn!(domain = %root_domain, "Link discovery ran out of time");
                    state.out_of_time = true;
                    Vec::new()
                }
            };

            if started.elapsed() < budget {
                state.enter(CrawlPhase::BuildQueue);
                let queue = build_queue(&base, &links, request.max_pages);
                debug!(
                    discovered = links.len(),
                    queued = queue.len(),
                    "Fetch queue built"
                );
                self.fetch_queue(state, &queue, &root_domain, started, budget)
                    .await;
            } else {
                state.out_of_time = true;
            }
        } else {
            debug!("Time budget exhausted after homepage");
            state.out_of_time = true;
        }

        if !state.found_valid_email && !state.candidates.is_empty() {
            state.enter(CrawlPhase::ValidateAll);
            let candidates = state.candidates.clone();
            self.validate_candidates(state, &candidates, FOUND_ON_MULTIPLE, &root_domain)
                .await;
        }

        state.enter(CrawlPhase::Done);
        Ok(())
    }

    /// 分批并发抓取队列
    ///
    /// 每批开始前检查耗时，超时后不再发起新批次；
    /// 已发起的批次不会被中断，单页耗时由获取器自身的超时约束
    async fn fetch_queue(
        &self,
        state: &mut CrawlState,
        queue: &[String],
        root_domain: &str,
        started: Instant,
        budget: Duration,
    ) {
        for batch in queue.chunks(self.settings.batch_size()) {
            if started.elapsed() >= budget {
                state.out_of_time = true;
                info!(
                    pages = state.pages_visited.len(),
                    queued = queue.len(),
                    "Time budget exhausted, no further batches"
                );
                break;
            }

            state.enter(CrawlPhase::BatchFetch);
            let handles = batch.iter().map(|url| {
                let fetcher = self.fetcher.clone();
                let url = url.clone();
                tokio::spawn(async move { fetcher.fetch(&url).await })
            });
            let results = join_all(handles).await;
            metrics::counter!(CRAWL_PAGES_FETCHED_TOTAL).increment(batch.len() as u64);

            state.enter(CrawlPhase::ExtractAll);
            for (url, joined) in batch.iter().zip(results) {
                let page = joined
                    .unwrap_or_else(|e| FetchResult::failed(url, 0, format!("fetch task failed: {}", e)));
                let path = page_path(url);
                state.record_visit(path.clone());

                if !page.success {
                    let err = ScraperError::Fetch {
                        url: url.clone(),
                        reason: page.error.unwrap_or_default(),
                    };
                    debug!(error = %err, "Page skipped");
                    continue;
                }

                let candidates = self.extract(page.html, url).await;
                self.validate_candidates(state, &candidates, &path, root_domain)
                    .await;
                state.add_candidates(candidates);
            }
        }
    }

    /// 在阻塞线程池中提取邮箱，失败时该页面不贡献候选
    async fn extract(&self, html: String, url: &str) -> Vec<String> {
        let extractor = self.extractor.clone();
        let page_url = url.to_string();
        match tokio::task::spawn_blocking(move || extractor.extract(&html, &page_url)).await {
            Ok(candidates) => candidates,
            Err(e) => {
                let err = ScraperError::Extraction {
                    url: url.to_string(),
                    reason: e.to_string(),
                };
                warn!(error = %err, "Email extraction failed");
                Vec::new()
            }
        }
    }

    /// 过滤并验证候选邮箱，有效邮箱写入结果
    ///
    /// # 返回值
    ///
    /// 本次是否得到至少一个有效邮箱
    async fn validate_candidates(
        &self,
        state: &mut CrawlState,
        candidates: &[String],
        found_on: &str,
        root_domain: &str,
    ) -> bool {
        let mut found = false;

        for email in candidates {
            let Some(domain) = email_domain(email) else {
                continue;
            };
            if !is_acceptable(domain, root_domain) {
                continue;
            }
            if state.reported.contains(email) {
                found = true;
                continue;
            }

            let validation = self.validator.validate(email).await;
            if !validation.is_valid() {
                continue;
            }

            state.reported.insert(email.clone());
            state.emails.push(EmailFinding {
                email: email.clone(),
                domain: domain.to_string(),
                mx_valid: true,
                found_on: found_on.to_string(),
                mx_records: validation.mx_records,
            });
            metrics::counter!(CRAWL_EMAILS_FOUND_TOTAL).increment(1);
            debug!(email = %email, found_on, "Valid email recorded");
            found = true;
        }

        if found {
            state.found_valid_email = true;
        }
        found
    }
}

#[cfg(test)]
#[path = "crawl_orchestrator_test.rs"]
mod tests;
