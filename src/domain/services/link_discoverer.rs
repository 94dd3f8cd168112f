// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::domain::models::{DiscoveredLink, LinkSource};
use crate::engines::traits::PageFetcher;
use crate::utils::url_utils::{build_url, is_same_root_domain, normalize_for_dedup, resolve_url};

/// 链接相关度关键词
pub const RELEVANT_KEYWORDS: &[&str] = &[
    "contact",
    "about",
    "support",
    "help",
    "sales",
    "team",
    "company",
    "reach",
    "connect",
    "inquiry",
    "quote",
    "pricing",
    "service",
    "customer",
    "faq",
    "business",
    "enterprise",
    "partner",
];

/// 未发现足够链接时依次尝试的常见联系页路径
pub const CONTACT_PAGES: &[&str] = &[
    "/contact",
    "/contact-us",
    "/contactus",
    "/contact_us",
    "/get-in-touch",
    "/reach-us",
    "/contact-information",
    "/contact.html",
    "/contact.php",
    "/about",
    "/about-us",
    "/aboutus",
    "/about_us",
    "/who-we-are",
    "/our-story",
    "/our-company",
    "/company",
    "/company-info",
    "/about.html",
    "/support",
    "/help",
    "/customer-service",
    "/customer-support",
    "/customer-care",
    "/service",
    "/helpdesk",
    "/help-center",
    "/faq",
    "/frequently-asked-questions",
    "/contact-support",
    "/sales",
    "/sales-inquiry",
    "/request-quote",
    "/get-quote",
    "/quote",
    "/pricing",
    "/buy",
    "/purchase",
    "/order",
    "/wholesale",
    "/bulk-orders",
    "/b2b",
    "/business",
    "/enterprise",
    "/partner",
    "/partnerships",
    "/distributors",
    "/resellers",
    "/vendors",
];

/// 被排除的路径段
const EXCLUDED_SEGMENTS: &[&str] = &[
    "wp-admin",
    "wp-content",
    "wp-includes",
    "static",
    "assets",
    "css",
    "js",
    "images",
    "img",
    "fonts",
    "media",
    "uploads",
    "files",
];

const EXCLUDED_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".ico", ".zip", ".exe", ".dmg",
];

const EXCLUDED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:"];

const SITEMAP_CANDIDATES: &[&str] = &["/sitemap.xml", "/sitemap_index.xml", "/sitemap1.xml"];

/// 每个来源最多读取的站点地图文档数
const MAX_SITEMAP_DOCUMENTS: usize = 20;
/// 每个来源最多收集的站点地图链接数
const MAX_SITEMAP_LINKS: usize = 5_000;
const MAX_LINK_TEXT_CHARS: usize = 100;
const JSON_LD_URL_KEYS: &[&str] = &["url", "href", "link", "@id", "sameAs"];

static ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href], area[href]").unwrap());
static ONCLICK_ELEMENTS: Lazy<Selector> = Lazy::new(|| Selector::parse("[onclick]").unwrap());
static DATA_HREF: Lazy<Selector> = Lazy::new(|| Selector::parse("[data-href]").unwrap());
static JSON_LD: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"script[type="application/ld+json"]"#).unwrap());
static META: Lazy<Selector> = Lazy::new(|| Selector::parse("meta[content]").unwrap());
static LOC: Lazy<Selector> = Lazy::new(|| Selector::parse("loc").unwrap());

static CONTACT_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)contact|about|support|help").unwrap());

static ONCLICK_RES: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r#"window\.location\.href\s*=\s*['"]([^'"]+)['"]"#,
        r#"window\.open\s*\(['"]([^'"]+)['"]"#,
        r#"location\.href\s*=\s*['"]([^'"]+)['"]"#,
        r#"location\.replace\s*\(['"]([^'"]+)['"]"#,
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// 计算链接相关度
///
/// 基础分5，URL或链接文本中每出现一个关键词加1，上限10
pub fn relevance_score(url: &str, link_text: &str) -> u8 {
    let haystack = format!("{} {}", url.to_lowercase(), link_text.to_lowercase());
    let hits = RELEVANT_KEYWORDS
        .iter()
        .filter(|k| haystack.contains(*k))
        .count();
    (5 + hits).min(10) as u8
}

/// URL是否指向静态资源、后台目录或非HTTP协议
pub fn is_excluded(url: &str) -> bool {
    let lower = url.trim().to_ascii_lowercase();
    if EXCLUDED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return true;
    }

    let path = match Url::parse(&lower) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => lower.split(['?', '#']).next().unwrap_or_default().to_string(),
    };

    EXCLUDED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        || path
            .split('/')
            .any(|segment| EXCLUDED_SEGMENTS.contains(&segment))
}

fn clean_link_text(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .chars()
        .take(MAX_LINK_TEXT_CHARS)
        .collect()
}

/// 单次发现过程的上下文
struct DiscoveryScope<'a> {
    base: Url,
    root_domain: &'a str,
}

impl DiscoveryScope<'_> {
    /// 将原始href转换为候选链接
    ///
    /// 排除空链接、锚点、被排除的路径以及跨根域名的链接
    fn build_link(&self, href: &str, text: &str, source: LinkSource) -> Option<DiscoveredLink> {
        let href = href.trim();
        if href.is_empty() || href.starts_with('#') || is_excluded(href) {
            return None;
        }

        let mut url = resolve_url(&self.base, href).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        url.set_fragment(None);

        let absolute = url.to_string();
        if is_excluded(&absolute) || !is_same_root_domain(&absolute, self.root_domain) {
            return None;
        }

        let link_text = clean_link_text(text);
        let path = url.path().to_string();
        let relevance_score = relevance_score(&absolute, &link_text);
        let priority = match source {
            LinkSource::Homepage => {
                let lower_path = path.to_lowercase();
                let keyword_hit = RELEVANT_KEYWORDS
                    .iter()
                    .any(|k| lower_path.contains(k) || link_text.contains(k));
                if keyword_hit {
                    9
                } else {
                    7
                }
            }
            other => other.base_priority(),
        };

        Some(DiscoveredLink {
            url: absolute,
            path,
            source,
            priority,
            relevance_score,
            link_text,
        })
    }

    /// 首页的锚点、onclick跳转与 `data-href`
    fn scan_homepage(&self, document: &Html) -> Vec<DiscoveredLink> {
        let mut links = Vec::new();

        for anchor in document.select(&ANCHORS) {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let text = anchor.text().collect::<String>();
            links.extend(self.build_link(href, &text, LinkSource::Homepage));
        }

        for element in document.select(&ONCLICK_ELEMENTS) {
            let class = element.value().attr("class").unwrap_or_default();
            if !CONTACT_CLASS_RE.is_match(class) {
                continue;
            }
            let Some(onclick) = element.value().attr("onclick") else {
                continue;
            };
            let text = element.text().collect::<String>();
            // `location.href` also matches inside `window.location.href`
            let mut targets: Vec<&str> = Vec::new();
            for re in ONCLICK_RES.iter() {
                for caps in re.captures_iter(onclick) {
                    if let Some(m) = caps.get(1) {
                        if !targets.contains(&m.as_str()) {
                            targets.push(m.as_str());
                        }
                    }
                }
            }
            for target in targets {
                links.extend(self.build_link(target, &text, LinkSource::Homepage));
            }
        }

        for element in document.select(&DATA_HREF) {
            if let Some(href) = element.value().attr("data-href") {
                let text = element.text().collect::<String>();
                links.extend(self.build_link(href, &text, LinkSource::Homepage));
            }
        }

        links
    }

    /// JSON-LD中的URL字段与 og:/twitter: 元数据
    fn scan_seo(&self, document: &Html) -> Vec<DiscoveredLink> {
        let mut links = Vec::new();

        for script in document.select(&JSON_LD) {
            let raw = script.text().collect::<String>();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => {
                    let mut urls = Vec::new();
                    collect_json_ld_urls(&value, &mut urls);
                    for url in urls {
                        links.extend(self.build_link(&url, "", LinkSource::SeoJsonld));
                    }
                }
                Err(e) => debug!(error = %e, "Skipping malformed JSON-LD block"),
            }
        }

        for meta in document.select(&META) {
            let key = meta
                .value()
                .attr("property")
                .or_else(|| meta.value().attr("name"))
                .unwrap_or_default()
                .to_ascii_lowercase();
            if !(key.starts_with("og:") || key.starts_with("twitter:")) {
                continue;
            }
            let content = meta.value().attr("content").unwrap_or_default().trim();
            let lower = content.to_ascii_lowercase();
            if lower.starts_with("http://") || lower.starts_with("https://") {
                links.extend(self.build_link(content, "", LinkSource::SeoMeta));
            }
        }

        links
    }
}

/// 递归收集JSON-LD中的URL类字段
fn collect_json_ld_urls(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                if JSON_LD_URL_KEYS.contains(&key.as_str()) {
                    match child {
                        Value::String(s) => out.push(s.clone()),
                        Value::Array(items) => out.extend(
                            items
                                .iter()
                                .filter_map(|item| item.as_str().map(str::to_string)),
                        ),
                        _ => {}
                    }
                }
                if child.is_object() || child.is_array() {
                    collect_json_ld_urls(child, out);
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_json_ld_urls(item, out);
            }
        }
        _ => {}
    }
}

/// 站点地图文档中的条目
#[derive(Debug, Default, PartialEq)]
struct SitemapEntries {
    pages: Vec<String>,
    nested: Vec<String>,
}

/// 解析站点地图或站点地图索引
///
/// `<sitemap><loc>` 视为嵌套站点地图，其他 `<loc>` 视为页面
fn parse_sitemap(xml: &str) -> SitemapEntries {
    let cleaned = xml.replace("<![CDATA[", "").replace("]]>", "");
    let document = Html::parse_document(&cleaned);
    let mut entries = SitemapEntries::default();

    for loc in document.select(&LOC) {
        let value = loc.text().collect::<String>().trim().to_string();
        if value.is_empty() {
            continue;
        }
        let parent_is_sitemap = loc
            .parent()
            .and_then(ElementRef::wrap)
            .is_some_and(|p| p.value().name().eq_ignore_ascii_case("sitemap"));
        if parent_is_sitemap {
            entries.nested.push(value);
        } else {
            entries.pages.push(value);
        }
    }

    entries
}

/// 从robots.txt中读取 `Sitemap:` 指令
fn parse_robots_sitemaps(robots: &str) -> Vec<String> {
    robots
        .lines()
        .filter_map(|line| {
            let (key, value) = line.split_once(':')?;
            if !key.trim().eq_ignore_ascii_case("sitemap") {
                return None;
            }
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        })
        .collect()
}

/// 按去重键合并候选链接
///
/// 同一页面保留 `(priority, relevance_score)` 较高的一条，
/// 最终按该键降序稳定排序
pub fn merge_links(links: Vec<DiscoveredLink>) -> Vec<DiscoveredLink> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<DiscoveredLink> = Vec::new();

    for link in links {
        let key = normalize_for_dedup(&link.url).unwrap_or_else(|_| link.url.clone());
        match index.get(&key) {
            Some(&pos) => {
                if link.rank() > merged[pos].rank() {
                    merged[pos] = link;
                }
            }
            None => {
                index.insert(key, merged.len());
                merged.push(link);
            }
        }
    }

    merged.sort_by(|a, b| b.rank().cmp(&a.rank()));
    merged
}

/// 链接发现器
///
/// 从首页、站点地图、robots.txt与SEO元数据中收集同根域名的候选页面
pub struct LinkDiscoverer {
    fetcher: Arc<dyn PageFetcher>,
}

impl LinkDiscoverer {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    /// 发现候选页面
    ///
    /// # 参数
    ///
    /// * `base_url` - 站点基础URL，形如 `https://example.com`
    /// * `root_domain` - 根域名，不属于该根域名的链接被丢弃
    /// * `homepage_html` - 已获取的首页HTML，为None时重新获取
    ///
    /// # 返回值
    ///
    /// 去重后按优先级与相关度降序排列的链接；单个来源失败只会使该来源为空
    pub async fn discover(
        &self,
        base_url: &str,
        root_domain: &str,
        homepage_html: Option<&str>,
    ) -> Vec<DiscoveredLink> {
        let base = match Url::parse(base_url) {
            Ok(base) => base,
            Err(e) => {
                warn!(base_url, error = %e, "Cannot discover links for invalid base url");
                return Vec::new();
            }
        };
        let scope = DiscoveryScope { base, root_domain };

        let homepage = async {
            match homepage_html {
                Some(html) => Some(html.to_string()),
                None => {
                    let result = self.fetcher.fetch(base_url).await;
                    result.success.then_some(result.html)
                }
            }
        };
        let (homepage, sitemap_links, robots_links) = futures::join!(
            homepage,
            self.scan_default_sitemaps(&scope),
            self.scan_robots(&scope)
        );

        let (homepage_links, seo_links) = match homepage {
            Some(html) => {
                let document = Html::parse_document(&html);
                (scope.scan_homepage(&document), scope.scan_seo(&document))
            }
            None => {
                debug!(base_url, "Homepage unavailable for link discovery");
                (Vec::new(), Vec::new())
            }
        };

        debug!(
            base_url,
            homepage = homepage_links.len(),
            sitemap = sitemap_links.len(),
            robots = robots_links.len(),
            seo = seo_links.len(),
            "Link sources scanned"
        );

        let mut all = homepage_links;
        all.extend(sitemap_links);
        all.extend(robots_links);
        all.extend(seo_links);

        let merged = merge_links(all);
        debug!(base_url, count = merged.len(), "Links discovered");
        merged
    }

    /// 依次尝试常见站点地图位置，使用第一个包含条目的文档
    async fn scan_default_sitemaps(&self, scope: &DiscoveryScope<'_>) -> Vec<DiscoveredLink> {
        let base = scope.base.as_str();
        for candidate in SITEMAP_CANDIDATES {
            let url = build_url(base, candidate);
            let result = self.fetcher.fetch_plain(&url).await;
            if !result.success {
                continue;
            }
            let entries = parse_sitemap(&result.html);
            if entries.pages.is_empty() && entries.nested.is_empty() {
                continue;
            }
            return self
                .walk_sitemaps(scope, url, entries, LinkSource::Sitemap)
                .await;
        }
        Vec::new()
    }

    /// 读取robots.txt声明的站点地图
    async fn scan_robots(&self, scope: &DiscoveryScope<'_>) -> Vec<DiscoveredLink> {
        let robots_url = build_url(scope.base.as_str(), "/robots.txt");
        let result = self.fetcher.fetch_plain(&robots_url).await;
        if !result.success {
            return Vec::new();
        }

        let mut links = Vec::new();
        for declared in parse_robots_sitemaps(&result.html) {
            let Ok(sitemap_url) = resolve_url(&scope.base, &declared) else {
                continue;
            };
            let fetched = self.fetcher.fetch_plain(sitemap_url.as_str()).await;
            if !fetched.success {
                continue;
            }
            let entries = parse_sitemap(&fetched.html);
            links.extend(
                self.walk_sitemaps(scope, sitemap_url.to_string(), entries, LinkSource::Robots)
                    .await,
            );
        }
        links
    }

    /// 遍历站点地图及其嵌套文档
    ///
    /// 以已访问集合防止循环，文档数与链接数均有上限
    async fn walk_sitemaps(
        &self,
        scope: &DiscoveryScope<'_>,
        first_url: String,
        first: SitemapEntries,
        source: LinkSource,
    ) -> Vec<DiscoveredLink> {
        let mut visited = HashSet::from([first_url]);
        let mut pending = VecDeque::new();
        let mut links = Vec::new();
        let mut documents = 1;

        let mut current = Some(first);
        while let Some(entries) = current.take() {
            for page in &entries.pages {
                if links.len() >= MAX_SITEMAP_LINKS {
                    break;
                }
                links.extend(scope.build_link(page, "", source));
            }
            for nested in entries.nested {
                if is_same_root_domain(&nested, scope.root_domain) && !visited.contains(&nested) {
                    pending.push_back(nested);
                }
            }

            while let Some(next) = pending.pop_front() {
                if documents >= MAX_SITEMAP_DOCUMENTS || links.len() >= MAX_SITEMAP_LINKS {
                    break;
                }
                if !visited.insert(next.clone()) {
                    continue;
                }
                documents += 1;
                let fetched = self.fetcher.fetch_plain(&next).await;
                if fetched.success {
                    current = Some(parse_sitemap(&fetched.html));
                    break;
                }
            }
        }

        links
    }
}

#[cfg(test)]
#[path = "link_discoverer_test.rs"]
mod tests;
