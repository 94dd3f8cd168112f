// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

//! 单元测试共用的协作者替身

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::config::settings::{CacheSettings, ScraperSettings, Settings};
use crate::domain::models::MxRecord;
use crate::engines::traits::{FetchResult, PageFetcher};
use crate::infrastructure::cache::memory_backend::MemoryBackend;
use crate::infrastructure::cache::MxCache;
use crate::infrastructure::dns::{DnsError, MxResolver};

/// 预设页面的抓取替身，记录每次请求的URL
#[derive(Default)]
pub struct StubFetcher {
    pages: HashMap<String, (u16, String)>,
    delay: Option<Duration>,
    page_delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册一个返回200的页面，URL按原样匹配（忽略末尾斜杠）
    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages
            .insert(url.trim_end_matches('/').to_string(), (200, html.to_string()));
        self
    }

    pub fn status(mut self, url: &str, status: u16) -> Self {
        self.pages
            .insert(url.trim_end_matches('/').to_string(), (status, String::new()));
        self
    }

    /// 注册一个延迟返回的页面
    pub fn slow_page(mut self, url: &str, html: &str, delay: Duration) -> Self {
        self.page_delays
            .insert(url.trim_end_matches('/').to_string(), delay);
        self.page(url, html)
    }

    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl PageFetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> FetchResult {
        self.requests.lock().unwrap().push(url.to_string());
        let delay = self
            .page_delays
            .get(url.trim_end_matches('/'))
            .copied()
            .or(self.delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.pages.get(url.trim_end_matches('/')) {
            Some((200, html)) => FetchResult::ok(url, 200, html.clone()),
            Some((status, _)) => FetchResult::failed(url, *status, format!("HTTP error {}", status)),
            None => FetchResult::failed(url, 404, "HTTP error 404"),
        }
    }
}

/// 记录查询次数的MX解析替身，仅对注册域名返回记录
#[derive(Default)]
pub struct CountingResolver {
    domains: HashMap<String, Vec<MxRecord>>,
    queries: AtomicUsize,
}

impl CountingResolver {
    pub fn with_mx(domains: &[&str]) -> Self {
        let domains = domains
            .iter()
            .map(|d| {
                (
                    d.to_string(),
                    vec![MxRecord {
                        preference: 10,
                        exchange: format!("mx.{}", d),
                    }],
                )
            })
            .collect();
        Self {
            domains,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MxResolver for CountingResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.domains
            .get(domain)
            .cloned()
            .ok_or_else(|| DnsError::NxDomain(domain.to_string()))
    }
}

pub fn scraper_settings() -> ScraperSettings {
    Settings::defaults().unwrap().scraper
}

pub fn cache_settings() -> CacheSettings {
    Settings::defaults().unwrap().cache
}

/// 基于进程内后端的缓存
pub async fn memory_cache() -> (Arc<MemoryBackend>, MxCache) {
    let backend = Arc::new(MemoryBackend::new());
    let cache = MxCache::with_backend(backend.clone(), &cache_settings()).await;
    (backend, cache)
}
