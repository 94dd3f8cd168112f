// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::sync::Arc;

use tracing::debug;
use validator::ValidateEmail;

use crate::domain::models::ValidationResult;
use crate::infrastructure::cache::MxCache;
use crate::infrastructure::dns::MxResolver;
use crate::infrastructure::metrics::{DNS_MX_QUERIES_TOTAL, MX_CACHE_HITS_TOTAL};

/// MX验证服务
///
/// 校验邮箱语法并查询域名MX记录，查询结果（包括失败）写入缓存
pub struct MxValidator {
    resolver: Arc<dyn MxResolver>,
    cache: MxCache,
}

impl MxValidator {
    pub fn new(resolver: Arc<dyn MxResolver>, cache: MxCache) -> Self {
        Self { resolver, cache }
    }

    pub fn cache(&self) -> &MxCache {
        &self.cache
    }

    /// 语法校验
    ///
    /// 在通用邮箱语法之上要求域名含 `.` 且本地部分不超过64个字符
    pub fn is_valid_syntax(email: &str) -> bool {
        let Some((local, domain)) = email.rsplit_once('@') else {
            return false;
        };
        !local.is_empty()
            && local.len() <= 64
            && domain.contains('.')
            && !domain.starts_with('.')
            && !domain.ends_with('.')
            && email.validate_email()
    }

    /// 验证单个邮箱
    ///
    /// DNS失败作为数据处理：统一映射为 `has_mx=false`，从不返回错误
    ///
    /// # 参数
    ///
    /// * `email` - 待验证邮箱
    ///
    /// # 返回值
    ///
    /// 验证结果
    pub async fn validate(&self, email: &str) -> ValidationResult {
        let email = email.trim().to_ascii_lowercase();
        let mut result = ValidationResult {
            email: email.clone(),
            ..Default::default()
        };

        let domain = match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && !domain.is_empty() => domain.to_string(),
            _ => {
                result.error = Some("no domain".to_string());
                return result;
            }
        };
        result.domain = Some(domain.clone());

        if let Some(cached) = self.cache.get_mx_status(&domain).await {
            metrics::counter!(MX_CACHE_HITS_TOTAL).increment(1);
            result.valid_format = true;
            result.has_mx = cached.has_mx;
            result.mx_records = cached.mx_records;
            debug!(email = %email, has_mx = result.has_mx, "Using cached MX validation");
            return result;
        }

        if !Self::is_valid_syntax(&email) {
            result.error = Some("invalid email format".to_string());
            return result;
        }
        result.valid_format = true;

        if self.cache.is_marked_invalid(&domain).await {
            debug!(domain = %domain, "Domain known to be invalid");
            return result;
        }

        match self.resolver.lookup_mx(&domain).await {
            Ok(records) => {
                metrics::counter!(DNS_MX_QUERIES_TOTAL, "outcome" => "found").increment(1);
                result.has_mx = true;
                result.mx_records = records;
            }
            Err(e) => {
                metrics::counter!(DNS_MX_QUERIES_TOTAL, "outcome" => "none").increment(1);
                debug!(domain = %domain, error = %e, "No usable MX records");
            }
        }

        self.cache
            .set_mx_status(&domain, result.has_mx, &result.mx_records)
            .await;
        if !result.has_mx {
            self.cache.mark_invalid(&domain).await;
        }

        debug!(email = %email, has_mx = result.has_mx, "Email validated");
        result
    }

    /// 逐个验证邮箱
    pub async fn validate_batch(&self, emails: &[String]) -> Vec<ValidationResult> {
        let mut results = Vec::with_capacity(emails.len());
        for email in emails {
            results.push(self.validate(email).await);
        }
        results
    }
}

#[cfg(test)]
#[path = "mx_validator_test.rs"]
mod tests;
