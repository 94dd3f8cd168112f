// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 健康检查响应
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HealthResponseDto {
    pub status: String,
    pub version: String,
    pub cache_enabled: bool,
    pub cache_connected: bool,
}

/// 运行统计响应
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatsResponseDto {
    pub version: String,
    pub cache_enabled: bool,
    pub cache_connected: bool,
    /// 缓存命名空间下的键数量，仅在缓存可连通时返回
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_keys: Option<usize>,
}

/// 缓存清理响应
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CacheClearResponseDto {
    pub success: bool,
    /// `domain`、`namespace` 或 `all`
    pub scope: String,
    /// 删除的键数量，清空数据库时为None
    pub removed: Option<u64>,
}
