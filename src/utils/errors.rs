// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use thiserror::Error;

/// 抓取流程错误类型
///
/// 除 `InvalidUrl` 外，其余错误均只影响单个页面或单个邮箱，
/// 由编排器转换为中性结果后继续执行
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScraperError {
    /// 输入URL无法规范化或无法提取根域名
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// 单页抓取失败
    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// 单页邮箱提取失败
    #[error("Extraction failed for {url}: {reason}")]
    Extraction { url: String, reason: String },

    /// DNS查询失败
    #[error("DNS lookup failed for {domain}: {reason}")]
    Dns { domain: String, reason: String },

    /// 缓存操作失败
    #[error("Cache error: {0}")]
    Cache(String),

    /// 未预期的内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ScraperError {
    /// 判断错误是否终止整个抓取
    ///
    /// # 返回值
    ///
    /// 仅输入URL错误与内部错误会终止抓取
    pub fn is_fatal(&self) -> bool {
        matches!(self, ScraperError::InvalidUrl(_) | ScraperError::Internal(_))
    }
}
