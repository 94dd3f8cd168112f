// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use redis::AsyncCommands;

use super::backend::{CacheBackend, CacheError};

/// Redis客户端
///
/// 提供对Redis数据库的异步操作接口，每次操作获取一个多路复用连接
#[derive(Clone)]
pub struct RedisClient {
    /// Redis客户端
    client: redis::Client,
}

impl RedisClient {
    /// 创建新的Redis客户端实例
    ///
    /// 仅解析URL，不会立即建立连接
    ///
    /// # 参数
    ///
    /// * `redis_url` - Redis连接URL
    ///
    /// # 返回值
    ///
    /// * `Ok(RedisClient)` - Redis客户端实例
    /// * `Err(CacheError)` - URL无效
    pub fn new(redis_url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        Ok(self.client.get_multiplexed_async_connection().await?)
    }
}

#[async_trait]
impl CacheBackend for RedisClient {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut con = self.connection().await?;
        let value: Option<String> = con.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CacheError> {
        let mut con = self.connection().await?;
        con.set_ex::<_, _, ()>(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool, CacheError> {
        let mut con = self.connection().await?;
        let exists: bool = con.exists(key).await?;
        Ok(exists)
    }

    async fn del(&self, keys: &[String]) -> Result<u64, CacheError> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut con = self.connection().await?;
        let removed: u64 = con.del(keys).await?;
        Ok(removed)
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, CacheError> {
        let mut con = self.connection().await?;
        let keys: Vec<String> = con.keys(format!("{}*", prefix)).await?;
        Ok(keys)
    }

    async fn flush(&self) -> Result<(), CacheError> {
        let mut con = self.connection().await?;
        redis::cmd("FLUSHDB").query_async::<()>(&mut con).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut con = self.connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut con).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
