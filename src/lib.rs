// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 应用程序模块
///
/// 包含HTTP接口的数据传输对象
pub mod application;

/// 配置模块
///
/// 处理应用程序的配置设置和环境变量
pub mod config;

/// 领域模块
///
/// 包含抓取与验证流水线的实体和服务
pub mod domain;

/// 引擎模块
///
/// 实现HTTP与浏览器渲染两种页面获取引擎
pub mod engines;

/// 基础设施模块
///
/// 提供缓存、DNS与指标等外部服务集成
pub mod infrastructure;

/// 表示层模块
///
/// 处理HTTP请求和响应，包括路由与处理器
pub mod presentation;

/// 工具模块
///
/// 提供URL处理、错误类型与日志初始化
pub mod utils;

#[cfg(test)]
mod test_support;
