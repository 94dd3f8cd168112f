// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

/// 缓存错误类型
#[derive(Error, Debug)]
pub enum CacheError {
    /// Redis后端错误
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
    /// 序列化错误
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// 后端不可用
    #[error("Cache backend unavailable: {0}")]
    Unavailable(String),
}

/// 键值缓存后端接口
///
/// 对应 GET/SETEX/EXISTS/DEL/KEYS/FLUSH 操作，所有单键操作需原子执行
#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 读取键值
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 写入键值并设置过期时间（秒）
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError>;

    /// 判断键是否存在
    async fn exists(&self, key: &str) -> Result<bool, CacheError>;

    /// 删除键，返回删除数量
    async fn del(&self, keys: &[String]) -> Result<u64, CacheError>;

    /// 列出以指定前缀开头的键
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError>;

    /// 清空整个数据库
    async fn flush(&self) -> Result<(), CacheError>;

    /// 连通性检查
    async fn ping(&self) -> Result<(), CacheError>;

    /// 后端名称
    fn name(&self) -> &'static str;
}
