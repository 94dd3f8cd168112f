// Copyright 2025 Kirky.X
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// 抓取请求数据传输对象
///
/// 未提供的字段使用服务配置中的默认值
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ScrapeRequestDto {
    /// 目标网站URL，可省略协议
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
    /// 最大访问页数
    #[validate(range(min = 1, max = 100))]
    pub max_pages: Option<usize>,
    /// 整体超时（秒）
    #[validate(range(min = 5, max = 300))]
    pub timeout: Option<u64>,
}

/// 缓存清理查询参数
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CacheClearQuery {
    /// 只清理该域名的缓存
    pub domain: Option<String>,
    /// 清空整个缓存数据库
    #[serde(default)]
    pub all: bool,
}
