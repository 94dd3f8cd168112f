// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::TokioAsyncResolver;
use tracing::debug;

use super::resolver::{DnsError, MxResolver};
use crate::config::settings::DnsSettings;
use crate::domain::models::MxRecord;

/// 基于hickory-resolver的MX解析器
///
/// 超时与重试次数由配置决定，重试由解析器自身完成
pub struct HickoryMxResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryMxResolver {
    /// 使用系统默认上游创建解析器
    pub fn new(settings: &DnsSettings) -> Self {
        let mut opts = ResolverOpts::default();
        opts.timeout = Duration::from_secs(settings.timeout_seconds.max(1));
        opts.attempts = settings.retries.max(1);

        Self {
            resolver: TokioAsyncResolver::tokio(ResolverConfig::default(), opts),
        }
    }
}

fn map_resolve_error(domain: &str, err: &ResolveError) -> DnsError {
    match err.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NXDomain {
                DnsError::NxDomain(domain.to_string())
            } else {
                DnsError::NoAnswer(domain.to_string())
            }
        }
        ResolveErrorKind::Timeout => DnsError::Timeout(domain.to_string()),
        _ => DnsError::Other(err.to_string()),
    }
}

#[async_trait]
impl MxResolver for HickoryMxResolver {
    async fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, DnsError> {
        // fully qualified to skip search-domain expansion
        let fqdn = format!("{}.", domain.trim_end_matches('.'));
        let lookup = self
            .resolver
            .mx_lookup(fqdn)
            .await
            .map_err(|e| map_resolve_error(domain, &e))?;

        let mut records: Vec<MxRecord> = lookup
            .iter()
            .map(|mx| MxRecord {
                preference: mx.preference(),
                exchange: mx.exchange().to_utf8().trim_end_matches('.').to_string(),
            })
            .collect();

        if records.is_empty() {
            return Err(DnsError::NoAnswer(domain.to_string()));
        }

        records.sort_by_key(|r| r.preference);
        debug!(domain, count = records.len(), "MX lookup succeeded");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_is_mapped() {
        let err = ResolveError::from(ResolveErrorKind::Timeout);
        assert_eq!(
            map_resolve_error("acme.com", &err),
            DnsError::Timeout("acme.com".to_string())
        );
    }

    #[test]
    fn test_other_errors_keep_message() {
        let err = ResolveError::from("connection refused");
        assert!(matches!(
            map_resolve_error("acme.com", &err),
            DnsError::Other(msg) if msg.contains("connection refused")
        ));
    }
}
