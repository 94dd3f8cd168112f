// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::models::MxRecord;

/// DNS查询错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    /// 域名不存在
    #[error("NXDOMAIN: {0}")]
    NxDomain(String),
    /// 域名存在但没有MX记录
    #[error("No MX answer for {0}")]
    NoAnswer(String),
    /// 查询超时
    #[error("DNS timeout for {0}")]
    Timeout(String),
    /// 其他DNS错误
    #[error("DNS error: {0}")]
    Other(String),
}

/// MX记录解析器接口
#[async_trait]
pub trait MxResolver: Send + Sync {
    /// 查询域名的MX记录，按优先级升序排列
    ///
    /// # 参数
    ///
    /// * `domain` - 待查询域名
    ///
    /// # 返回值
    ///
    /// * `Ok(Vec<MxRecord>)` - 至少一条MX记录
    /// * `Err(DnsError)` - 查询失败或无记录
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError>;
}
