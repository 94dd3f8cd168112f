// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use mailcrawl::config::settings::Settings;
use mailcrawl::domain::models::MxRecord;
use mailcrawl::domain::services::{CrawlOrchestrator, MxValidator};
use mailcrawl::engines::router::EngineRouter;
use mailcrawl::infrastructure::cache::memory_backend::MemoryBackend;
use mailcrawl::infrastructure::cache::MxCache;
use mailcrawl::infrastructure::dns::{DnsError, MxResolver};
use mailcrawl::presentation::routes;
use mailcrawl::utils::telemetry;
use serde_json::Value;

/// 只对注册域名返回MX记录的解析器
pub struct StaticResolver {
    records: HashMap<String, Vec<MxRecord>>,
    queries: AtomicUsize,
}

impl StaticResolver {
    pub fn new(domains: &[&str]) -> Self {
        let records = domains
            .iter()
            .map(|d| {
                (
                    d.to_string(),
                    vec![MxRecord {
                        preference: 5,
                        exchange: format!("mail.{}", d),
                    }],
                )
            })
            .collect();
        Self {
            records,
            queries: AtomicUsize::new(0),
        }
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MxResolver for StaticResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        self.records
            .get(domain)
            .cloned()
            .ok_or_else(|| DnsError::NoAnswer(domain.to_string()))
    }
}

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub orchestrator: Arc<CrawlOrchestrator>,
    pub resolver: Arc<StaticResolver>,
    pub backend: Arc<MemoryBackend>,
}

/// 使用真实HTTP引擎、进程内缓存与静态解析器组装应用
pub async fn create_test_app(mx_domains: &[&str]) -> TestApp {
    telemetry::try_init_test_telemetry();

    let settings = Settings::defaults().expect("default settings");
    let backend = Arc::new(MemoryBackend::new());
    let cache = MxCache::with_backend(backend.clone(), &settings.cache).await;
    let resolver = Arc::new(StaticResolver::new(mx_domains));
    let fetcher = Arc::new(EngineRouter::from_settings(&settings.scraper).expect("engine router"));

    let orchestrator = Arc::new(CrawlOrchestrator::new(
        fetcher,
        MxValidator::new(resolver.clone(), cache),
        settings.scraper.clone(),
    ));

    TestApp {
        router: routes::create_router(orchestrator.clone()),
        orchestrator,
        resolver,
        backend,
    }
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[allow(dead_code)]
pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn json_body(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
