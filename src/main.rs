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

use std::sync::Arc;

use mailcrawl::config::settings::Settings;
use mailcrawl::domain::services::{CrawlOrchestrator, MxValidator};
use mailcrawl::engines::router::EngineRouter;
use mailcrawl::infrastructure::cache::MxCache;
use mailcrawl::infrastructure::dns::HickoryMxResolver;
use mailcrawl::presentation::routes;
use mailcrawl::utils::telemetry;
use tokio::net::TcpListener;
use tracing::info;

/// 主函数
///
/// 应用程序入口点，负责初始化所有组件并启动服务
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Initialize logging
    telemetry::init_telemetry();
    info!("Starting mailcrawl...");

    // 2. Load configuration
    let settings = Settings::new()?;
    info!("Configuration loaded");

    mailcrawl::infrastructure::metrics::init_metrics(&settings.server);

    // 3. Collaborators: cache, DNS resolver, page fetcher
    let cache = MxCache::connect(&settings.cache).await;
    let resolver = Arc::new(HickoryMxResolver::new(&settings.dns));
    let fetcher = Arc::new(EngineRouter::from_settings(&settings.scraper)?);
    info!(
        cache_enabled = cache.is_enabled(),
        js_rendering = settings.scraper.enable_js_rendering,
        "Collaborators initialized"
    );

    // 4. Orchestrator with explicit lifecycle
    let validator = MxValidator::new(resolver, cache);
    let orchestrator = Arc::new(CrawlOrchestrator::new(
        fetcher,
        validator,
        settings.scraper.clone(),
    ));
    orchestrator.init().await;

    // 5. Start HTTP server
    let app = routes::create_router(orchestrator.clone());
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    orchestrator.shutdown().await;
    info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
