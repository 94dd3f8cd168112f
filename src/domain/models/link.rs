// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 链接来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSource {
    Homepage,
    Sitemap,
    SeoJsonld,
    SeoMeta,
    Robots,
}

impl LinkSource {
    /// 来源的基础优先级
    pub fn base_priority(&self) -> u8 {
        match self {
            LinkSource::Sitemap | LinkSource::Robots => 8,
            LinkSource::Homepage => 7,
            LinkSource::SeoJsonld => 6,
            LinkSource::SeoMeta => 5,
        }
    }
}

/// 发现的候选页面
///
/// 仅在一次抓取中使用，用于构建抓取队列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveredLink {
    pub url: String,
    pub path: String,
    pub source: LinkSource,
    /// 0..=10
    pub priority: u8,
    /// 0..=10
    pub relevance_score: u8,
    /// 小写，最多100个字符
    pub link_text: String,
}

impl DiscoveredLink {
    /// 排序键
    pub fn rank(&self) -> (u8, u8) {
        (self.priority, self.relevance_score)
    }
}
