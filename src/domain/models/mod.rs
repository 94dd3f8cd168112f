// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心业务实体，包括：
/// - 抓取（crawl）：抓取请求、抓取结果与邮箱发现
/// - 链接（link）：链接发现阶段产生的候选页面
/// - MX（mx）：MX记录、缓存状态与验证结果
pub mod crawl;
pub mod link;
pub mod mx;

pub use crawl::{CrawlRequest, CrawlResult, EmailFinding};
pub use link::{DiscoveredLink, LinkSource};
pub use mx::{CachedMxStatus, MxRecord, ValidationResult};
