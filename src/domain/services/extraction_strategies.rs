// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node, Selector};
use serde_json::Value;

/// 通用邮箱匹配
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").unwrap());

/// mailto链接，截止到引号、空白、尖括号或查询串
static MAILTO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)mailto:([^"'\s<>?]+)"#).unwrap());

/// 混淆写法，每个模式依次捕获 本地部分 / 域名 / 顶级域
static OBFUSCATION_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // name [at] domain [dot] com
        Regex::new(
            r"(?i)\b([a-z0-9._%+-]+)\s*\[\s*at\s*\]\s*([a-z0-9-]+(?:(?:\s*\[\s*dot\s*\]\s*|\.)[a-z0-9-]+)*)\s*\[\s*dot\s*\]\s*([a-z]{2,})\b",
        )
        .unwrap(),
        // name (at) domain (dot) com
        Regex::new(
            r"(?i)\b([a-z0-9._%+-]+)\s*\(\s*at\s*\)\s*([a-z0-9-]+(?:(?:\s*\(\s*dot\s*\)\s*|\.)[a-z0-9-]+)*)\s*\(\s*dot\s*\)\s*([a-z]{2,})\b",
        )
        .unwrap(),
        // name AT domain DOT com
        Regex::new(
            r"\b([A-Za-z0-9._%+-]+)\s+(?:AT|at)\s+([A-Za-z0-9-]+(?:(?:\s+(?:DOT|dot)\s+|\.)[A-Za-z0-9-]+)*)\s+(?:DOT|dot)\s+([A-Za-z]{2,})\b",
        )
        .unwrap(),
        // name [a] domain.com / name (a) domain.com
        Regex::new(r"(?i)\b([a-z0-9._%+-]+)\s*[\(\[]a[\)\]]\s*([a-z0-9.-]+)\s*\.\s*([a-z]{2,})\b")
            .unwrap(),
    ]
});

/// 嵌套在域名中的混淆点号
static INNER_DOT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s*\[\s*dot\s*\]\s*|\s*\(\s*dot\s*\)\s*|\s+dot\s+").unwrap()
});

static ALL_ELEMENTS: Lazy<Selector> = Lazy::new(|| Selector::parse("*").unwrap());
static TEXT_CONTAINERS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(
        "div, span, p, li, td, th, a, address, footer, header, section, strong, em, b, small, label, h1, h2, h3, h4, h5, h6",
    )
    .unwrap()
});
static SCRIPT_STYLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("script, style, noscript").unwrap());
static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());

/// 单次提取使用的已解析页面
pub struct ParsedPage<'a> {
    /// 原始HTML
    pub raw: &'a str,
    /// HTML实体解码后的原文
    pub decoded: String,
    /// DOM
    pub document: Html,
}

impl<'a> ParsedPage<'a> {
    pub fn parse(raw: &'a str) -> Self {
        Self {
            raw,
            decoded: html_escape::decode_html_entities(raw).into_owned(),
            document: Html::parse_document(raw),
        }
    }

    /// 所有文本节点以空格拼接
    fn full_text(&self) -> String {
        self.document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 邮箱提取策略
///
/// 每个策略独立产出候选字符串，清洗与去重由调用方统一完成
pub trait ExtractionStrategy: Send + Sync {
    /// 策略名称
    fn name(&self) -> &'static str;

    /// 从页面提取候选
    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String>;
}

fn sweep(text: &str, out: &mut Vec<String>) {
    out.extend(EMAIL_RE.find_iter(text).map(|m| m.as_str().to_string()));
}

/// 原始HTML全文正则扫描，同时扫描实体解码后的文本
pub struct RawHtmlStrategy;

impl ExtractionStrategy for RawHtmlStrategy {
    fn name(&self) -> &'static str {
        "raw_html"
    }

    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String> {
        let mut out = Vec::new();
        sweep(page.raw, &mut out);
        if page.decoded != page.raw {
            sweep(&page.decoded, &mut out);
        }
        out
    }
}

/// 文本节点扫描
///
/// 逐个文本节点扫描，并对常见容器元素的拼接文本再扫描一次，
/// 以覆盖被行内标签拆开的地址
pub struct TextNodeStrategy;

impl ExtractionStrategy for TextNodeStrategy {
    fn name(&self) -> &'static str {
        "text_nodes"
    }

    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String> {
        let mut out = Vec::new();
        for node in page.document.tree.nodes() {
            if let Node::Text(text) = node.value() {
                if text.contains('@') {
                    sweep(text, &mut out);
                }
            }
        }
        for element in page.document.select(&TEXT_CONTAINERS) {
            let joined = join_text(element.text());
            if joined.contains('@') {
                sweep(&joined, &mut out);
            }
        }
        out
    }
}

/// 拼接元素下的文本节点
///
/// 仅在 `@` 或 `.` 两侧直接相连，其余节点之间以空格分隔，
/// 避免把标签文字与相邻地址拼成不存在的邮箱
fn join_text<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for part in parts {
        if part.is_empty() {
            continue;
        }
        let glued = joined.is_empty()
            || joined.ends_with(['@', '.'])
            || part.starts_with(['@', '.']);
        if !glued {
            joined.push(' ');
        }
        joined.push_str(part);
    }
    joined
}

/// 所有元素的所有属性值中含 `@` 的部分
pub struct AttributeStrategy;

impl ExtractionStrategy for AttributeStrategy {
    fn name(&self) -> &'static str {
        "attributes"
    }

    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String> {
        let mut out = Vec::new();
        for element in page.document.select(&ALL_ELEMENTS) {
            for (_, value) in element.value().attrs() {
                if value.contains('@') {
                    sweep(value, &mut out);
                }
            }
        }
        out
    }
}

/// HTML注释
pub struct CommentStrategy;

impl ExtractionStrategy for CommentStrategy {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String> {
        let mut out = Vec::new();
        for node in page.document.tree.nodes() {
            if let Node::Comment(comment) = node.value() {
                sweep(comment, &mut out);
            }
        }
        out
    }
}

/// 拆分mailto目标：去掉查询串、百分号解码、按逗号拆分多个收件人
fn mailto_targets(target: &str) -> Vec<String> {
    let target = target.split('?').next().unwrap_or_default();
    let decoded = urlencoding::decode(target)
        .map(|d| d.into_owned())
        .unwrap_or_else(|_| target.to_string());
    decoded
        .split([',', ';'])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// mailto链接
pub struct MailtoStrategy;

impl ExtractionStrategy for MailtoStrategy {
    fn name(&self) -> &'static str {
        "mailto"
    }

    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String> {
        let mut out = Vec::new();
        for element in page.document.select(&ALL_ELEMENTS) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                let is_mailto = href
                    .get(..7)
                    .is_some_and(|scheme| scheme.eq_ignore_ascii_case("mailto:"));
                if is_mailto {
                    out.extend(mailto_targets(&href[7..]));
                }
            }
        }
        // mailto URIs built in scripts or inline handlers
        for caps in MAILTO_RE.captures_iter(&page.decoded) {
            out.extend(mailto_targets(&caps[1]));
        }
        out
    }
}

/// 混淆地址还原
pub struct ObfuscationStrategy;

impl ObfuscationStrategy {
    fn reconstruct(text: &str, out: &mut Vec<String>) {
        for re in OBFUSCATION_RES.iter() {
            for caps in re.captures_iter(text) {
                let domain = INNER_DOT_RE.replace_all(&caps[2], ".");
                out.push(format!("{}@{}.{}", &caps[1], domain, &caps[3]));
            }
        }
    }
}

impl ExtractionStrategy for ObfuscationStrategy {
    fn name(&self) -> &'static str {
        "obfuscation"
    }

    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String> {
        let mut out = Vec::new();
        Self::reconstruct(&page.full_text(), &mut out);
        Self::reconstruct(&page.decoded, &mut out);
        out
    }
}

/// script与style元素内容
pub struct ScriptStyleStrategy;

impl ExtractionStrategy for ScriptStyleStrategy {
    fn name(&self) -> &'static str {
        "script_style"
    }

    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String> {
        let mut out = Vec::new();
        for element in page.document.select(&SCRIPT_STYLE) {
            let content: String = element.text().collect();
            sweep(&content, &mut out);
        }
        out
    }
}

/// Cloudflare邮箱保护：首字节为密钥，其余字节与其异或
fn decode_cfemail(hex: &str) -> Option<String> {
    if hex.len() < 4 || hex.len() % 2 != 0 {
        return None;
    }
    let bytes: Vec<u8> = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect::<Option<_>>()?;
    let key = bytes[0];
    String::from_utf8(bytes[1..].iter().map(|b| b ^ key).collect()).ok()
}

/// `data-*` 属性
///
/// 包括 `data-cfemail` 编码与 `data-user`/`data-domain` 拆分写法
pub struct DataAttributeStrategy;

impl ExtractionStrategy for DataAttributeStrategy {
    fn name(&self) -> &'static str {
        "data_attributes"
    }

    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String> {
        let mut out = Vec::new();
        for element in page.document.select(&ALL_ELEMENTS) {
            let el = element.value();
            for (name, value) in el.attrs() {
                if !name.starts_with("data-") {
                    continue;
                }
                if name == "data-cfemail" {
                    out.extend(decode_cfemail(value.trim()));
                } else {
                    sweep(value, &mut out);
                }
            }
            if let (Some(user), Some(domain)) = (el.attr("data-user"), el.attr("data-domain")) {
                out.push(format!("{}@{}", user.trim(), domain.trim()));
            }
        }
        out
    }
}

/// 结构化数据：JSON-LD与 `itemprop` 含 email 的元素
pub struct StructuredDataStrategy;

impl StructuredDataStrategy {
    fn walk(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::String(s) => {
                if s.contains('@') {
                    sweep(s, out);
                }
            }
            Value::Array(items) => items.iter().for_each(|v| Self::walk(v, out)),
            Value::Object(map) => map.values().for_each(|v| Self::walk(v, out)),
            _ => {}
        }
    }
}

impl ExtractionStrategy for StructuredDataStrategy {
    fn name(&self) -> &'static str {
        "structured_data"
    }

    fn extract(&self, page: &ParsedPage<'_>) -> Vec<String> {
        let mut out = Vec::new();

        for script in page.document.select(&JSON_LD) {
            let body: String = script.text().collect();
            match serde_json::from_str::<Value>(body.trim()) {
                Ok(json) => Self::walk(&json, &mut out),
                // malformed blocks still get a plain sweep
                Err(_) => sweep(&body, &mut out),
            }
        }

        for element in page.document.select(&ALL_ELEMENTS) {
            let el = element.value();
            let is_email_prop = el
                .attr("itemprop")
                .is_some_and(|p| p.to_ascii_lowercase().contains("email"));
            if !is_email_prop {
                continue;
            }
            if let Some(content) = el.attr("content") {
                out.push(content.to_string());
            }
            if let Some(href) = el.attr("href") {
                out.push(href.to_string());
            }
            let text = join_text(element.text());
            if text.contains('@') {
                sweep(&text, &mut out);
            }
        }

        out
    }
}

/// 默认注册的全部策略
pub fn default_strategies() -> Vec<Box<dyn ExtractionStrategy>> {
    vec![
        Box::new(RawHtmlStrategy),
        Box::new(TextNodeStrategy),
        Box::new(AttributeStrategy),
        Box::new(CommentStrategy),
        Box::new(MailtoStrategy),
        Box::new(ObfuscationStrategy),
        Box::new(ScriptStyleStrategy),
        Box::new(DataAttributeStrategy),
        Box::new(StructuredDataStrategy),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(strategy: &dyn ExtractionStrategy, html: &str) -> Vec<String> {
        let page = ParsedPage::parse(html);
        strategy.extract(&page)
    }

    #[test]
    fn test_raw_sweep_sees_entity_encoded_address() {
        let found = run(&RawHtmlStrategy, "<p>info&#64;acme.com</p>");
        assert!(found.contains(&"info@acme.com".to_string()));
    }

    #[test]
    fn test_text_nodes_join_split_address() {
        let found = run(
            &TextNodeStrategy,
            "<p>sales@<span>acme.com</span></p>",
        );
        assert!(found.contains(&"sales@acme.com".to_string()));
    }

    #[test]
    fn test_text_nodes_keep_label_apart_from_address() {
        let found = run(
            &TextNodeStrategy,
            r#"<ul><li><span>Email</span><a href="mailto:info@acme.com">info@acme.com</a></li></ul>"#,
        );
        assert!(found.contains(&"info@acme.com".to_string()));
        assert!(!found.iter().any(|e| e == "emailinfo@acme.com" || e == "Emailinfo@acme.com"));
    }

    #[test]
    fn test_join_text_glues_only_around_separators() {
        assert_eq!(join_text(["Email", "info@acme.com"].into_iter()), "Email info@acme.com");
        assert_eq!(join_text(["sales", "@acme", ".com"].into_iter()), "sales@acme.com");
        assert_eq!(join_text(["", "a@", "b.org"].into_iter()), "a@b.org");
    }

    #[test]
    fn test_any_attribute() {
        let found = run(
            &AttributeStrategy,
            r#"<img title="write to hr@acme.com" src="x.png">"#,
        );
        assert_eq!(found, vec!["hr@acme.com"]);
    }

    #[test]
    fn test_comments_only() {
        let found = run(&CommentStrategy, "<!-- contact: a@b.co --><p>x@y.com</p>");
        assert_eq!(found, vec!["a@b.co"]);
    }

    #[test]
    fn test_mailto_strips_query_and_decodes() {
        let found = run(
            &MailtoStrategy,
            r#"<a href="MAILTO:foo%2Bbar@bar.com?subject=hi">x</a>"#,
        );
        assert!(found.contains(&"foo+bar@bar.com".to_string()));
    }

    #[test]
    fn test_mailto_multiple_recipients() {
        assert_eq!(
            mailto_targets("a@x.com,b@y.com?cc=c@z.com"),
            vec!["a@x.com", "b@y.com"]
        );
    }

    #[test]
    fn test_obfuscation_variants() {
        let html = "<p>john [at] example [dot] com</p>\
                    <p>jane (at) example (dot) org</p>\
                    <p>bob AT example DOT net</p>\
                    <p>amy [a] example.io</p>\
                    <p>ops [at] mail [dot] example [dot] co</p>";
        let found = run(&ObfuscationStrategy, html);
        for expected in [
            "john@example.com",
            "jane@example.org",
            "bob@example.net",
            "amy@example.io",
            "ops@mail.example.co",
        ] {
            assert!(found.iter().any(|f| f == expected), "missing {}", expected);
        }
    }

    #[test]
    fn test_script_and_style() {
        let found = run(
            &ScriptStyleStrategy,
            r#"<script>var e = "js@acme.com";</script><p>text@acme.com</p>"#,
        );
        assert_eq!(found, vec!["js@acme.com"]);
    }

    #[test]
    fn test_data_attributes_and_cfemail() {
        // "a@b.co" xor 0x42
        let key = 0x42u8;
        let encoded: String = std::iter::once(key)
            .chain("a@b.co".bytes().map(|b| b ^ key))
            .map(|b| format!("{:02x}", b))
            .collect();
        let html = format!(
            r#"<span data-email="d@acme.com"></span>
               <a data-cfemail="{}">[email protected]</a>
               <span data-user="sales" data-domain="acme.com"></span>"#,
            encoded
        );
        let found = run(&DataAttributeStrategy, &html);
        assert!(found.contains(&"d@acme.com".to_string()));
        assert!(found.contains(&"a@b.co".to_string()));
        assert!(found.contains(&"sales@acme.com".to_string()));
    }

    #[test]
    fn test_decode_cfemail_rejects_garbage() {
        assert_eq!(decode_cfemail("zz"), None);
        assert_eq!(decode_cfemail("abc"), None);
    }

    #[test]
    fn test_structured_data() {
        let html = r#"
            <script type="application/ld+json">
              {"@type":"Organization","contactPoint":[{"email":"support@acme.com"}]}
            </script>
            <span itemprop="email">press@acme.com</span>
            <meta itemprop="Email" content="ir@acme.com">
        "#;
        let found = run(&StructuredDataStrategy, html);
        for expected in ["support@acme.com", "press@acme.com", "ir@acme.com"] {
            assert!(found.iter().any(|f| f == expected), "missing {}", expected);
        }
    }
}
