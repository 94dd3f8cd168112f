// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// 该模块包含系统的核心业务逻辑，包括：
/// - 领域模型（models）：抓取请求与结果、候选链接、MX记录
/// - 服务（services）：提取、发现、验证与编排
///
/// 领域层只通过trait依赖页面获取、DNS与缓存等外部协作者。
pub mod models;
pub mod services;
