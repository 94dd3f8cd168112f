// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use serde::{Deserialize, Serialize};

/// 单条MX记录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MxRecord {
    /// 优先级，数值越小越优先
    pub preference: u16,
    /// 邮件服务器主机名，不含末尾的点
    pub exchange: String,
}

/// 缓存中的域名MX状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedMxStatus {
    pub domain: String,
    pub has_mx: bool,
    pub mx_records: Vec<MxRecord>,
}

/// 单个邮箱的验证结果
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub email: String,
    pub valid_format: bool,
    pub has_mx: bool,
    pub mx_records: Vec<MxRecord>,
    pub domain: Option<String>,
    pub error: Option<String>,
}

impl ValidationResult {
    /// 格式合法且存在MX记录
    pub fn is_valid(&self) -> bool {
        self.valid_format && self.has_mx
    }
}
