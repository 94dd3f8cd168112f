// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::backend::{CacheBackend, CacheError};
use super::redis_client::RedisClient;
use crate::config::settings::CacheSettings;
use crate::domain::models::{CachedMxStatus, MxRecord};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// MX结果缓存
///
/// 保存域名的MX查询结果与无效域名标记，键格式为 `<namespace>:<type>:<domain>`。
/// 除 `clear`/`flush_all` 外所有操作都不会返回错误：后端故障时读取视为未命中，写入被忽略。
/// 构造时无法连通后端则进入禁用模式。
#[derive(Clone)]
pub struct MxCache {
    backend: Option<Arc<dyn CacheBackend>>,
    namespace: String,
    mx_ttl_seconds: u64,
    invalid_ttl_seconds: u64,
}

impl MxCache {
    /// 按配置连接Redis
    ///
    /// # 参数
    ///
    /// * `settings` - 缓存配置
    ///
    /// # 返回值
    ///
    /// 总是返回可用实例；配置关闭或Redis不可达时为禁用模式
    pub async fn connect(settings: &CacheSettings) -> Self {
        if !settings.enabled {
            info!("MX cache disabled by configuration");
            return Self::disabled(settings);
        }

        match RedisClient::new(&settings.redis_url) {
            Ok(client) => Self::with_backend(Arc::new(client), settings).await,
            Err(e) => {
                warn!(error = %e, "Invalid redis url, MX cache disabled");
                Self::disabled(settings)
            }
        }
    }

    /// 使用指定后端创建缓存
    ///
    /// 后端连通性检查失败时退化为禁用模式
    pub async fn with_backend(backend: Arc<dyn CacheBackend>, settings: &CacheSettings) -> Self {
        let reachable = matches!(
            tokio::time::timeout(CONNECT_TIMEOUT, backend.ping()).await,
            Ok(Ok(()))
        );

        if !reachable {
            warn!(
                backend = backend.name(),
                "Cache backend unreachable, MX cache disabled"
            );
            return Self::disabled(settings);
        }

        info!(backend = backend.name(), "MX cache connected");
        Self {
            backend: Some(backend),
            namespace: settings.namespace.clone(),
            mx_ttl_seconds: settings.mx_ttl_seconds,
            invalid_ttl_seconds: settings.invalid_ttl_seconds,
        }
    }

    /// 禁用模式：所有读取未命中，所有写入为空操作
    pub fn disabled(settings: &CacheSettings) -> Self {
        Self {
            backend: None,
            namespace: settings.namespace.clone(),
            mx_ttl_seconds: settings.mx_ttl_seconds,
            invalid_ttl_seconds: settings.invalid_ttl_seconds,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// 当前是否能连通后端
    pub async fn is_connected(&self) -> bool {
        match &self.backend {
            Some(backend) => backend.ping().await.is_ok(),
            None => false,
        }
    }

    fn key(&self, kind: &str, domain: &str) -> String {
        format!("{}:{}:{}", self.namespace, kind, domain.to_ascii_lowercase())
    }

    fn prefix(&self) -> String {
        format!("{}:", self.namespace)
    }

    /// 读取域名的MX状态
    ///
    /// 未命中、数据损坏或后端不可用时返回None
    pub async fn get_mx_status(&self, domain: &str) -> Option<CachedMxStatus> {
        let backend = self.backend.as_ref()?;
        let key = self.key("mx", domain);

        let raw = match backend.get(&key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(domain, error = %e, "MX cache read failed");
                return None;
            }
        };

        match serde_json::from_str::<CachedMxStatus>(&raw) {
            Ok(status) => {
                debug!(domain, has_mx = status.has_mx, "MX cache hit");
                Some(status)
            }
            Err(e) => {
                warn!(domain, error = %e, "Corrupt MX cache entry ignored");
                None
            }
        }
    }

    /// 写入域名的MX状态
    pub async fn set_mx_status(&self, domain: &str, has_mx: bool, mx_records: &[MxRecord]) {
        let Some(backend) = &self.backend else {
            return;
        };

        let status = CachedMxStatus {
            domain: domain.to_ascii_lowercase(),
            has_mx,
            mx_records: mx_records.to_vec(),
        };
        let result = match serde_json::to_string(&status) {
            Ok(value) => {
                backend
                    .set_ex(&self.key("mx", domain), &value, self.mx_ttl_seconds)
                    .await
            }
            Err(e) => Err(CacheError::from(e)),
        };

        if let Err(e) = result {
            warn!(domain, error = %e, "MX cache write failed");
        }
    }

    /// 域名是否被标记为无效，后端故障时返回false
    pub async fn is_marked_invalid(&self, domain: &str) -> bool {
        let Some(backend) = &self.backend else {
            return false;
        };

        match backend.exists(&self.key("invalid", domain)).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(domain, error = %e, "Invalid-domain lookup failed");
                false
            }
        }
    }

    /// 标记域名无效
    pub async fn mark_invalid(&self, domain: &str) {
        let Some(backend) = &self.backend else {
            return;
        };

        if let Err(e) = backend
            .set_ex(&self.key("invalid", domain), "1", self.invalid_ttl_seconds)
            .await
        {
            warn!(domain, error = %e, "Failed to mark domain invalid");
        } else {
            debug!(domain, "Domain marked invalid");
        }
    }

    /// 清除缓存
    ///
    /// # 参数
    ///
    /// * `domain` - 指定域名时删除该域名的两个键，否则删除命名空间下的全部键
    ///
    /// # 返回值
    ///
    /// * `Ok(u64)` - 删除的键数量，禁用模式下为0
    /// * `Err(CacheError)` - 后端操作失败
    pub async fn clear(&self, domain: Option<&str>) -> Result<u64, CacheError> {
        let Some(backend) = &self.backend else {
            return Ok(0);
        };

        let keys = match domain {
            Some(domain) => vec![self.key("mx", domain), self.key("invalid", domain)],
            None => backend.keys_with_prefix(&self.prefix()).await?,
        };

        let removed = backend.del(&keys).await?;
        info!(domain = domain.unwrap_or("*"), removed, "MX cache cleared");
        Ok(removed)
    }

    /// 清空整个后端数据库
    pub async fn flush_all(&self) -> Result<(), CacheError> {
        match &self.backend {
            Some(backend) => {
                backend.flush().await?;
                info!("Cache database flushed");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// 命名空间下的键数量，后端不可用时返回None
    pub async fn key_count(&self) -> Option<usize> {
        let backend = self.backend.as_ref()?;
        backend
            .keys_with_prefix(&self.prefix())
            .await
            .map(|keys| keys.len())
            .ok()
    }
}

#[cfg(test)]
#[path = "mx_cache_test.rs"]
mod tests;
