// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::extraction_strategies::{default_strategies, ExtractionStrategy, ParsedPage};

/// 候选邮箱的宽松语法
static CANDIDATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").unwrap());

const WRAPPING_CHARS: &[char] = &['"', '\'', '`', '<', '>', '(', ')', '[', ']', '{', '}'];
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '>'];

/// 清洗单个候选
///
/// 去除首尾空白、引号与括号，反复去除末尾标点，去掉 `mailto:` 前缀并转小写。
/// 不满足候选语法时返回None
pub fn clean_candidate(raw: &str) -> Option<String> {
    let mut candidate = raw.trim().trim_matches(WRAPPING_CHARS).trim();

    if candidate
        .get(..7)
        .is_some_and(|p| p.eq_ignore_ascii_case("mailto:"))
    {
        candidate = &candidate[7..];
    }

    let candidate = candidate
        .trim_end_matches(TRAILING_PUNCTUATION)
        .trim_matches(WRAPPING_CHARS)
        .trim()
        .to_lowercase();

    is_candidate(&candidate).then_some(candidate)
}

/// 候选语法检查
///
/// 恰好一个 `@`，本地部分1到64个字符，域名含 `.` 且顶级域至少两个字符
pub fn is_candidate(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };

    if local.is_empty() || local.len() > 64 || !domain.contains('.') {
        return false;
    }

    let tld_ok = domain
        .rsplit('.')
        .next()
        .is_some_and(|tld| tld.len() >= 2);

    tld_ok && CANDIDATE_RE.is_match(email)
}

/// 邮箱提取器
///
/// 依次运行所有注册的策略，合并结果后统一清洗、去重。
/// 结果保留首次发现的顺序
pub struct EmailExtractor {
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl Default for EmailExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl EmailExtractor {
    /// 使用全部默认策略
    pub fn new() -> Self {
        Self {
            strategies: default_strategies(),
        }
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// 从HTML中提取邮箱
    ///
    /// # 参数
    ///
    /// * `html` - 原始HTML
    /// * `base_url` - 页面URL，仅用于日志
    ///
    /// # 返回值
    ///
    /// 规范化、去重后的小写邮箱
    pub fn extract(&self, html: &str, base_url: &str) -> Vec<String> {
        if html.trim().is_empty() {
            return Vec::new();
        }

        let page = ParsedPage::parse(html);
        let mut seen = HashSet::new();
        let mut emails = Vec::new();

        for strategy in &self.strategies {
            let candidates = strategy.extract(&page);
            let before = emails.len();
            for email in candidates.iter().filter_map(|c| clean_candidate(c)) {
                if seen.insert(email.clone()) {
                    emails.push(email);
                }
            }
            if emails.len() > before {
                debug!(
                    strategy = strategy.name(),
                    new = emails.len() - before,
                    url = base_url,
                    "Strategy found emails"
                );
            }
        }

        debug!(count = emails.len(), url = base_url, "Emails extracted");
        emails
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mailto_link() {
        let extractor = EmailExtractor::new();
        let emails = extractor.extract(r#"<a href="mailto:foo@bar.com">Mail</a>"#, "");
        assert!(emails.contains(&"foo@bar.com".to_string()));
    }

    #[test]
    fn test_obfuscated_text() {
        let extractor = EmailExtractor::new();
        let emails = extractor.extract("<p>john [at] example [dot] com</p>", "");
        assert!(emails.contains(&"john@example.com".to_string()));
    }

    #[test]
    fn test_label_next_to_address_is_not_merged() {
        let html = r#"<ul><li><span>Email</span><a href="mailto:info@acme.com">info@acme.com</a></li></ul>"#;
        let emails = EmailExtractor::new().extract(html, "https://acme.com");
        assert_eq!(emails, vec!["info@acme.com"]);
    }

    #[test]
    fn test_comment() {
        let extractor = EmailExtractor::new();
        let emails = extractor.extract("<!-- contact: a@b.co -->", "");
        assert!(emails.contains(&"a@b.co".to_string()));
    }

    #[test]
    fn test_union_is_deduplicated_and_lowercased() {
        let html = r#"
            <html><body>
              <a href="mailto:Info@Acme.com?subject=Hi">Info@Acme.com</a>
              <p data-contact="info@acme.com">Write to INFO@ACME.COM.</p>
            </body></html>
        "#;
        let emails = EmailExtractor::new().extract(html, "https://acme.com");
        assert_eq!(emails, vec!["info@acme.com"]);
    }

    #[test]
    fn test_every_candidate_matches_grammar() {
        let html = r#"
            <p>weird@@acme.com, no-tld@acme, ok.one@acme.co.uk;</p>
            <p>(paren@acme.io) "quoted@acme.io" <angle@acme.io></p>
            <img src="logo@x">
            <script>var s = "a@b.c";</script>
        "#;
        let emails = EmailExtractor::new().extract(html, "");
        assert!(!emails.is_empty());
        for email in &emails {
            assert!(is_candidate(email), "{} should match grammar", email);
            assert!(!email.contains("@@"));
        }
        assert!(emails.contains(&"ok.one@acme.co.uk".to_string()));
        assert!(emails.contains(&"paren@acme.io".to_string()));
        assert!(!emails.iter().any(|e| e.ends_with("@b.c")));
    }

    #[test]
    fn test_clean_candidate() {
        assert_eq!(
            clean_candidate("  \"MAILTO:Sales@Acme.com).;\" "),
            Some("sales@acme.com".to_string())
        );
        assert_eq!(clean_candidate("<x@y.org>"), Some("x@y.org".to_string()));
        assert_eq!(clean_candidate("a@b@c.com"), None);
        assert_eq!(clean_candidate("user@localhost"), None);
        assert_eq!(clean_candidate("user@domain.c"), None);
        assert_eq!(clean_candidate(&format!("{}@acme.com", "a".repeat(65))), None);
    }

    #[test]
    fn test_empty_html() {
        assert!(EmailExtractor::new().extract("   ", "").is_empty());
    }

    #[test]
    fn test_registered_strategies() {
        let names = EmailExtractor::new().strategy_names();
        assert_eq!(names.len(), 9);
        assert_eq!(names[0], "raw_html");
        assert!(names.contains(&"structured_data"));
    }
}
