// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

use super::mx::MxRecord;

/// 默认最大访问页数
pub const DEFAULT_MAX_PAGES: usize = 50;
/// 默认整体超时（秒）
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
/// 多页累积验证时的来源标记
pub const FOUND_ON_MULTIPLE: &str = "multiple";

/// 抓取请求
///
/// 一次抓取调用的不可变输入，取值范围由请求层校验
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlRequest {
    /// 目标网站URL
    pub url: String,
    /// 最大访问页数
    pub max_pages: usize,
    /// 整体超时（秒）
    pub timeout_seconds: u64,
}

impl CrawlRequest {
    /// 使用默认预算创建请求
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pages: DEFAULT_MAX_PAGES,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    /// 设置最大访问页数，至少为1
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// 设置整体超时（秒）
    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }
}

/// 经过MX验证的邮箱
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailFinding {
    /// 规范化后的小写邮箱
    pub email: String,
    /// 邮箱所属域名，与 `email` 的域名部分一致
    pub domain: String,
    /// 是否存在MX记录
    pub mx_valid: bool,
    /// 发现该邮箱的页面路径，或 `multiple`
    pub found_on: String,
    /// MX记录
    pub mx_records: Vec<MxRecord>,
}

/// 抓取结果
///
/// 由编排器在一次抓取中逐步构建，结束时一次性输出
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrawlResult {
    /// 是否找到至少一个有效邮箱
    pub success: bool,
    /// 目标根域名
    pub domain: Option<String>,
    /// 已验证邮箱，按发现顺序排列
    pub emails: Vec<EmailFinding>,
    /// 访问过的页面路径，按首次访问顺序排列且不重复
    pub pages_visited: Vec<String>,
    /// 访问页数
    pub total_pages: usize,
    /// 执行耗时（秒）
    #[serde(rename = "execution_time")]
    pub execution_time_seconds: f64,
    /// 错误信息
    pub error: Option<String>,
}
