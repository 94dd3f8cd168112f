// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 该模块包含抓取与验证流水线的核心业务逻辑：
/// - 域名白名单（allow_list）：公共邮箱服务商与目标域名判定
/// - 邮箱提取（email_extractor / extraction_strategies）：多策略候选提取与清洗
/// - 链接发现（link_discoverer）：首页、站点地图、robots.txt与SEO元数据
/// - MX验证（mx_validator）：语法校验与带缓存的MX查询
/// - 抓取编排（crawl_orchestrator）：在页数与时间预算内驱动整个流程
pub mod allow_list;
pub mod crawl_orchestrator;
pub mod email_extractor;
pub mod extraction_strategies;
pub mod link_discoverer;
pub mod mx_validator;

pub use crawl_orchestrator::CrawlOrchestrator;
pub use email_extractor::EmailExtractor;
pub use link_discoverer::LinkDiscoverer;
pub use mx_validator::MxValidator;
