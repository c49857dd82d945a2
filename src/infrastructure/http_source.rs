// REST metrics source backed by the analytics and order services
use crate::application::metrics_source::MetricsSource;
use crate::domain::metrics::{MetricsSnapshot, OrdersPage, RealtimeSnapshot, RevenueTotal};
use crate::domain::trend::{Interval, TrendPayload};
use crate::infrastructure::config::{AnalyticsSettings, OrdersSettings};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpMetricsSource {
    client: reqwest::Client,
    analytics_url: String,
    orders_url: String,
    revenue_path: String,
    orders_path: String,
}

impl HttpMetricsSource {
    pub fn new(analytics: &AnalyticsSettings, orders: &OrdersSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(analytics.timeout_ms))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            analytics_url: analytics.base_url.trim_end_matches('/').to_string(),
            orders_url: orders.base_url.trim_end_matches('/').to_string(),
            revenue_path: orders.revenue_path.clone(),
            orders_path: orders.orders_path.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .header("Accept", "application/json")
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("{} failed with status {}: {}", url, status, body);
        }

        response
            .json::<T>()
            .await
            .with_context(|| format!("Failed to parse response from {}", url))
    }
}

#[async_trait]
impl MetricsSource for HttpMetricsSource {
    async fn get_order_metrics(&self) -> Result<MetricsSnapshot> {
        let url = format!("{}/metrics/orders", self.analytics_url);
        self.get_json(&url, &[]).await
    }

    async fn get_realtime_stats(&self) -> Result<RealtimeSnapshot> {
        let url = format!("{}/metrics/realtime", self.analytics_url);
        self.get_json(&url, &[]).await
    }

    async fn get_trends(&self, interval: Interval, bucket_count: u32) -> Result<TrendPayload> {
        let url = format!("{}/metrics/trends", self.analytics_url);
        let query = [
            ("interval", interval.as_str().to_string()),
            ("window", bucket_count.to_string()),
        ];
        self.get_json(&url, &query).await
    }

    async fn get_revenue_total(&self) -> Result<RevenueTotal> {
        let url = format!("{}{}", self.orders_url, self.revenue_path);
        self.get_json(&url, &[]).await
    }

    async fn get_orders_page(&self, offset: u64, limit: u64) -> Result<OrdersPage> {
        let url = format!("{}{}", self.orders_url, self.orders_path);
        let limit = limit.max(1);
        let query = [
            ("page", (offset / limit).to_string()),
            ("size", limit.to_string()),
        ];
        self.get_json(&url, &query).await
    }
}
