// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{Host, ParseError, Url};

use crate::utils::errors::ScraperError;

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 解析URL，缺少协议时补全 `https://`
fn parse_with_scheme(url: &str) -> Result<Url, ScraperError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(ScraperError::InvalidUrl("empty URL".to_string()));
    }

    let lower = trimmed.to_ascii_lowercase();
    let candidate = if lower.starts_with("http://") || lower.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let parsed =
        Url::parse(&candidate).map_err(|e| ScraperError::InvalidUrl(format!("{}: {}", url, e)))?;

    match parsed.host_str() {
        Some(host) if !host.is_empty() => Ok(parsed),
        _ => Err(ScraperError::InvalidUrl(format!("{}: missing host", url))),
    }
}

fn trim_path(url: &mut Url) {
    let trimmed = url.path().trim_end_matches('/').to_string();
    if trimmed.is_empty() {
        url.set_path("/");
    } else {
        url.set_path(&trimmed);
    }
}

/// 规范化URL
///
/// 补全协议、小写主机名、去掉片段与路径末尾的斜杠（空路径变为 `/`），保留查询参数
///
/// # 参数
///
/// * `url` - 原始URL
///
/// # 返回值
///
/// * `Ok(String)` - 规范化后的URL
/// * `Err(ScraperError::InvalidUrl)` - 无法解析或缺少主机
pub fn normalize(url: &str) -> Result<String, ScraperError> {
    let mut parsed = parse_with_scheme(url)?;
    parsed.set_fragment(None);
    trim_path(&mut parsed);
    Ok(parsed.to_string())
}

/// 用于去重比较的规范化形式，额外去掉查询参数
pub fn normalize_for_dedup(url: &str) -> Result<String, ScraperError> {
    let mut parsed = parse_with_scheme(url)?;
    parsed.set_fragment(None);
    parsed.set_query(None);
    trim_path(&mut parsed);
    Ok(parsed.to_string())
}

/// 提取可注册根域名
///
/// 基于公共后缀列表，例如 `www.sub.example.co.uk` 得到 `example.co.uk`。
/// IP地址主机原样返回。
///
/// # 参数
///
/// * `url` - 原始URL
///
/// # 返回值
///
/// * `Ok(String)` - 小写根域名
/// * `Err(ScraperError::InvalidUrl)` - 无法提取域名或后缀
pub fn extract_root_domain(url: &str) -> Result<String, ScraperError> {
    let parsed = parse_with_scheme(url)?;
    match parsed.host() {
        Some(Host::Ipv4(ip)) => return Ok(ip.to_string()),
        Some(Host::Ipv6(ip)) => return Ok(ip.to_string()),
        _ => {}
    }

    let host = parsed
        .host_str()
        .ok_or_else(|| ScraperError::InvalidUrl(format!("{}: missing host", url)))?
        .trim_end_matches('.')
        .to_ascii_lowercase();

    psl::domain_str(&host)
        .map(|d| d.to_string())
        .ok_or_else(|| ScraperError::InvalidUrl(format!("{}: no registrable domain", url)))
}

/// 返回 `scheme://host`，非默认端口会被保留
pub fn base_url(url: &str) -> Result<String, ScraperError> {
    let parsed = parse_with_scheme(url)?;
    let host = parsed
        .host_str()
        .ok_or_else(|| ScraperError::InvalidUrl(format!("{}: missing host", url)))?;
    Ok(match parsed.port() {
        Some(port) => format!("{}://{}:{}", parsed.scheme(), host, port),
        None => format!("{}://{}", parsed.scheme(), host),
    })
}

/// 拼接基础URL与路径，路径缺少前导 `/` 时自动补齐
pub fn build_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// 取得用于 `pages_visited` 的页面路径
///
/// 去掉查询与末尾斜杠，根路径为 `/`
pub fn page_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => {
            let trimmed = parsed.path().trim_end_matches('/');
            if trimmed.is_empty() {
                "/".to_string()
            } else {
                trimmed.to_string()
            }
        }
        Err(_) => url.to_string(),
    }
}

/// 判断URL是否属于指定根域名
pub fn is_same_root_domain(url: &str, root_domain: &str) -> bool {
    extract_root_domain(url)
        .map(|d| d.eq_ignore_ascii_case(root_domain))
        .unwrap_or(false)
}
