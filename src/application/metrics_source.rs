// Source trait for the analytics and order REST endpoints
use crate::domain::metrics::{MetricsSnapshot, OrdersPage, RealtimeSnapshot, RevenueTotal};
use crate::domain::trend::{Interval, TrendPayload};
use async_trait::async_trait;

#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Batch order metrics
    async fn get_order_metrics(&self) -> anyhow::Result<MetricsSnapshot>;

    /// Current realtime statistics
    async fn get_realtime_stats(&self) -> anyhow::Result<RealtimeSnapshot>;

    /// Trend buckets for an interval; the payload may omit or misreport its interval
    async fn get_trends(&self, interval: Interval, bucket_count: u32) -> anyhow::Result<TrendPayload>;

    /// Total revenue (fallback only)
    async fn get_revenue_total(&self) -> anyhow::Result<RevenueTotal>;

    /// Paged order listing (fallback only)
    async fn get_orders_page(&self, offset: u64, limit: u64) -> anyhow::Result<OrdersPage>;
}
