// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// 默认日志过滤规则，可被 `RUST_LOG` 覆盖
pub const DEFAULT_LOG_FILTER: &str = "info,mailcrawl=debug";

/// 初始化日志与追踪
///
/// 安装带 `EnvFilter` 的 tracing 订阅者，仅应在进程启动时调用一次
pub fn init_telemetry() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();
}

/// 尝试初始化日志（测试用）
///
/// 重复调用时静默忽略，便于多个测试共享同一订阅者
pub fn try_init_test_telemetry() {
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("warn,mailcrawl=debug"))
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
