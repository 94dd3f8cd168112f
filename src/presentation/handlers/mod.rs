// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// HTTP请求处理器模块
///
/// 包含各个API端点的具体处理逻辑
/// 处理器通过 `Extension` 共享同一个抓取编排器实例
pub mod cache_handler;
pub mod health_handler;
pub mod scrape_handler;
