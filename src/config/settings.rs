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

use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

/// 默认浏览器标识
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// 应用程序配置设置
///
/// 包含服务器、抓取、DNS与缓存等所有配置项
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// 服务器配置
    pub server: ServerSettings,
    /// 抓取配置
    pub scraper: ScraperSettings,
    /// DNS配置
    pub dns: DnsSettings,
    /// 缓存配置
    pub cache: CacheSettings,
}

/// 服务器配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    /// 服务器监听主机地址
    pub host: String,
    /// 服务器监听端口
    pub port: u16,
    /// Prometheus指标端口
    pub metrics_port: u16,
}

/// 抓取配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperSettings {
    /// 默认整体超时时间（秒）
    pub default_timeout: u64,
    /// 单页加载超时时间（秒）
    pub page_load_timeout: u64,
    /// 每批并发抓取数
    pub max_concurrent_requests: usize,
    /// 默认最大访问页数
    pub max_pages_to_visit: usize,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 是否启用浏览器渲染
    pub enable_js_rendering: bool,
    /// 是否并发抓取，关闭时逐页抓取
    pub concurrent_scraping: bool,
    /// 首页抓取在请求超时之外允许的额外时间（秒）
    pub timeout_grace_seconds: u64,
}

impl ScraperSettings {
    /// 单页加载超时
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout)
    }

    /// 实际批大小
    pub fn batch_size(&self) -> usize {
        if self.concurrent_scraping {
            self.max_concurrent_requests.max(1)
        } else {
            1
        }
    }
}

/// DNS配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct DnsSettings {
    /// 单次查询超时时间（秒）
    pub timeout_seconds: u64,
    /// 重试次数
    pub retries: usize,
}

/// 缓存配置设置
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSettings {
    /// 是否启用缓存
    pub enabled: bool,
    /// Redis连接URL
    pub redis_url: String,
    /// 键命名空间
    pub namespace: String,
    /// MX结果缓存时间（秒）
    pub mx_ttl_seconds: u64,
    /// 无效域名标记缓存时间（秒）
    pub invalid_ttl_seconds: u64,
}

impl Settings {
    /// 创建新的配置实例
    ///
    /// 依次加载默认值、`config/default`、`config/{APP_ENVIRONMENT}` 与 `MAILCRAWL__*` 环境变量
    ///
    /// # Returns
    ///
    /// * `Ok(Settings)` - 成功加载的配置
    /// * `Err(ConfigError)` - 配置加载失败
    pub fn new() -> Result<Self, ConfigError> {
        let env = std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| "default".to_string());
        let builder = Self::default_builder()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::with_prefix("MAILCRAWL").separator("__"));

        builder.build()?.try_deserialize()
    }

    /// 仅包含默认值的配置
    pub fn defaults() -> Result<Self, ConfigError> {
        Self::default_builder()?.build()?.try_deserialize()
    }

    fn default_builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8000)?
            .set_default("server.metrics_port", 9000)?
            .set_default("scraper.default_timeout", 30)?
            .set_default("scraper.page_load_timeout", 15)?
            .set_default("scraper.max_concurrent_requests", 10)?
            .set_default("scraper.max_pages_to_visit", 50)?
            .set_default("scraper.user_agent", DEFAULT_USER_AGENT)?
            .set_default("scraper.enable_js_rendering", false)?
            .set_default("scraper.concurrent_scraping", true)?
            .set_default("scraper.timeout_grace_seconds", 5)?
            .set_default("dns.timeout_seconds", 5)?
            .set_default("dns.retries", 3)?
            .set_default("cache.enabled", true)?
            .set_default("cache.redis_url", "redis://127.0.0.1:6379/0")?
            .set_default("cache.namespace", "scraper")?
            .set_default("cache.mx_ttl_seconds", 86400)?
            .set_default("cache.invalid_ttl_seconds", 604800)
    }
}

#[cfg(test)]
#[path = "settings_test.rs"]
mod tests;
