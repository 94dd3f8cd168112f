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

use crate::engines::traits::{EngineError, ScrapeRequest, ScrapeResponse, ScraperEngine};
use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig};
use futures::StreamExt;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// 在时限内执行加载，无论成功、失败或超时都执行关闭
async fn load_then_close<T, L, C>(limit: Duration, load: L, close: C) -> Result<T, EngineError>
where
    L: Future<Output = Result<T, EngineError>>,
    C: Future<Output = ()>,
{
    let loaded = tokio::time::timeout(limit, load).await;
    close.await;
    loaded.map_err(|_| EngineError::Timeout)?
}

/// 浏览器渲染引擎
///
/// 基于chromiumoxide，整个进程共享一个无头浏览器实例，每次抓取打开独立标签页。
/// 浏览器在首次使用时启动，启动失败后不再重试，交由HTTP引擎回退。
pub struct BrowserEngine {
    user_agent: String,
    request_timeout: Duration,
    browser: RwLock<Option<Browser>>,
    handler_task: Mutex<Option<JoinHandle<()>>>,
    launch_failed: AtomicBool,
}

impl BrowserEngine {
    pub fn new(user_agent: &str, request_timeout: Duration) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            request_timeout,
            browser: RwLock::new(None),
            handler_task: Mutex::new(None),
            launch_failed: AtomicBool::new(false),
        }
    }

    /// 浏览器是否已启动
    pub async fn is_running(&self) -> bool {
        self.browser.read().await.is_some()
    }

    async fn ensure_launched(&self) -> Result<(), EngineError> {
        if self.browser.read().await.is_some() {
            return Ok(());
        }
        if self.launch_failed.load(Ordering::SeqCst) {
            return Err(EngineError::BrowserUnavailable(
                "previous launch failed".to_string(),
            ));
        }

        let mut slot = self.browser.write().await;
        if slot.is_some() {
            return Ok(());
        }

        let config = BrowserConfig::builder()
            .no_sandbox()
            .request_timeout(self.request_timeout)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(EngineError::BrowserUnavailable)?;

        let (browser, mut handler) = match Browser::launch(config).await {
            Ok(pair) => pair,
            Err(e) => {
                self.launch_failed.store(true, Ordering::SeqCst);
                warn!(error = %e, "Headless browser launch failed, falling back to HTTP");
                return Err(EngineError::BrowserUnavailable(e.to_string()));
            }
        };

        // Drive browser events until the connection closes
        let task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        *self.handler_task.lock().await = Some(task);
        *slot = Some(browser);
        info!("Headless browser launched");
        Ok(())
    }
}

#[async_trait]
impl ScraperEngine for BrowserEngine {
    /// 在新标签页中加载并渲染页面
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResponse, EngineError> {
        if !request.needs_js {
            return Err(EngineError::Other("browser engine requires a JS request".into()));
        }

        self.ensure_launched().await?;
        let start = Instant::now();

        let guard = self.browser.read().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| EngineError::BrowserUnavailable("browser closed".to_string()))?;

        let page = tokio::time::timeout(request.timeout, browser.new_page("about:blank"))
            .await
            .map_err(|_| EngineError::Timeout)?
            .map_err(|e| EngineError::Other(e.to_string()))?;

        let closer = page.clone();
        let load = async {
            page.set_user_agent(self.user_agent.as_str())
                .await
                .map_err(|e| EngineError::Other(e.to_string()))?;
            page.goto(&request.url)
                .await
                .map_err(|e| EngineError::Other(e.to_string()))?;
            page.content()
                .await
                .map_err(|e| EngineError::Other(e.to_string()))
        };
        let close = async move {
            if let Err(e) = closer.close().await {
                debug!(error = %e, "Failed to close browser tab");
            }
        };
        let content = load_then_close(request.timeout, load, close).await?;

        Ok(ScrapeResponse {
            url: request.url.clone(),
            // page navigation does not expose the document status
            status_code: 200,
            content,
            content_type: "text/html".to_string(),
            response_time_ms: start.elapsed().as_millis() as u64,
        })
    }

    fn support_score(&self, request: &ScrapeRequest) -> u8 {
        if request.needs_js {
            100
        } else {
            0
        }
    }

    fn name(&self) -> &'static str {
        "browser"
    }

    async fn warm_up(&self) -> Result<(), EngineError> {
        self.ensure_launched().await
    }

    async fn shutdown(&self) {
        if let Some(mut browser) = self.browser.write().await.take() {
            if let Err(e) = browser.close().await {
                warn!(error = %e, "Failed to close headless browser");
            }
            let _ = browser.wait().await;
        }
        if let Some(task) = self.handler_task.lock().await.take() {
            task.abort();
        }
        info!("Browser engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_support_score_only_for_js_requests() {
        let engine = BrowserEngine::new("ua", Duration::from_secs(5));
        let request = ScrapeRequest::new("https://a.com", Duration::from_secs(5));
        assert_eq!(engine.support_score(&request), 0);
        assert_eq!(engine.support_score(&request.with_js(true)), 100);
    }

    #[tokio::test]
    async fn test_failed_launch_is_not_retried() {
        let engine = BrowserEngine::new("ua", Duration::from_secs(5));
        engine.launch_failed.store(true, Ordering::SeqCst);

        let request = ScrapeRequest::new("https://a.com", Duration::from_secs(5)).with_js(true);
        let result = engine.scrape(&request).await;
        assert!(matches!(result, Err(EngineError::BrowserUnavailable(_))));
        assert!(!engine.is_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_is_closed_when_load_times_out() {
        let closed = AtomicBool::new(false);
        let result: Result<String, EngineError> = load_then_close(
            Duration::from_secs(2),
            futures::future::pending(),
            async { closed.store(true, Ordering::SeqCst) },
        )
        .await;

        assert!(matches!(result, Err(EngineError::Timeout)));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_tab_is_closed_after_failed_load() {
        let closed = AtomicBool::new(false);
        let result: Result<String, EngineError> = load_then_close(
            Duration::from_secs(2),
            async { Err(EngineError::Other("net::ERR_NAME_NOT_RESOLVED".into())) },
            async { closed.store(true, Ordering::SeqCst) },
        )
        .await;

        assert!(matches!(result, Err(EngineError::Other(_))));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_shutdown_without_launch() {
        let engine = BrowserEngine::new("ua", Duration::from_secs(5));
        engine.shutdown().await;
        assert!(!engine.is_running().await);
    }
}
