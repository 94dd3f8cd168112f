// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// 该模块包含系统的技术实现细节，负责与外部系统的交互。
///
/// 包含的子模块：
/// - 缓存（cache）：MX结果缓存，Redis与进程内后端
/// - DNS（dns）：MX记录查询
/// - 指标（metrics）：Prometheus指标导出
pub mod cache;
pub mod dns;
pub mod metrics;
