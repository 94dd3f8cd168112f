// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::describe_counter;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::{IpAddr, SocketAddr};
use tracing::{info, warn};

use crate::config::settings::ServerSettings;

pub const CRAWLS_TOTAL: &str = "crawls_total";
pub const CRAWL_PAGES_FETCHED_TOTAL: &str = "crawl_pages_fetched_total";
pub const CRAWL_EMAILS_FOUND_TOTAL: &str = "crawl_emails_found_total";
pub const DNS_MX_QUERIES_TOTAL: &str = "dns_mx_queries_total";
pub const MX_CACHE_HITS_TOTAL: &str = "mx_cache_hits_total";

/// 安装Prometheus导出器并注册指标说明
///
/// 端口被占用时仅记录警告，服务照常启动
pub fn init_metrics(settings: &ServerSettings) {
    let ip: IpAddr = settings
        .host
        .parse()
        .unwrap_or(IpAddr::from([0, 0, 0, 0]));
    let addr = SocketAddr::new(ip, settings.metrics_port);

    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!(
            "Failed to install Prometheus recorder: {}. This might happen if the port is already in use.",
            e
        );
        return;
    }

    describe_counter!(CRAWLS_TOTAL, "Crawl invocations by outcome");
    describe_counter!(CRAWL_PAGES_FETCHED_TOTAL, "Page fetch attempts");
    describe_counter!(CRAWL_EMAILS_FOUND_TOTAL, "Validated emails returned");
    describe_counter!(DNS_MX_QUERIES_TOTAL, "Live MX lookups by outcome");
    describe_counter!(MX_CACHE_HITS_TOTAL, "MX validations answered from cache");

    info!("Metrics exporter listening on {}", addr);
}
