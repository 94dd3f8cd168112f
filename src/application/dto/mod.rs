// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// 定义HTTP接口的请求与响应结构，
/// 抓取结果直接使用领域模型 `CrawlResult` 序列化
pub mod scrape_request;
pub mod scrape_response;
