// In-memory doubles for the REST source and the push feed
use crate::application::metrics_source::MetricsSource;
use crate::application::push_feed::{FeedMessage, FeedStream, PushFeed};
use crate::domain::metrics::{MetricsSnapshot, OrdersPage, RealtimeSnapshot, RevenueTotal};
use crate::domain::trend::{Interval, TrendPayload};
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Scripted `MetricsSource`. Any response left unset fails.
#[derive(Default)]
pub struct MockSource {
    metrics: Option<MetricsSnapshot>,
    realtime: Option<RealtimeSnapshot>,
    trends: HashMap<Interval, TrendPayload>,
    revenue_total: Option<f64>,
    order_count: Option<u64>,
    failing_trends: Mutex<HashSet<Interval>>,
    gates: Mutex<HashMap<Interval, Arc<Notify>>>,
    metrics_gate: Option<Arc<Notify>>,
    trend_calls: Mutex<HashMap<Interval, usize>>,
    pub metrics_calls: AtomicUsize,
    pub realtime_calls: AtomicUsize,
    pub fallback_calls: AtomicUsize,
}

impl MockSource {
    pub fn with_metrics(mut self, metrics: MetricsSnapshot) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn with_realtime(mut self, realtime: RealtimeSnapshot) -> Self {
        self.realtime = Some(realtime);
        self
    }

    pub fn with_trends(mut self, interval: Interval, payload: TrendPayload) -> Self {
        self.trends.insert(interval, payload);
        self
    }

    pub fn with_fallback(mut self, revenue_total: Option<f64>, order_count: Option<u64>) -> Self {
        self.revenue_total = revenue_total;
        self.order_count = order_count;
        self
    }

    /// Holds the batch metrics response until the returned gate is notified.
    pub fn with_metrics_gate(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.metrics_gate = Some(gate.clone());
        (self, gate)
    }

    /// Holds trend responses for `interval` until the returned gate is notified.
    pub fn gate(&self, interval: Interval) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(interval)
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    pub fn fail_trends(&self, interval: Interval) {
        self.failing_trends.lock().unwrap().insert(interval);
    }

    pub fn trend_calls(&self, interval: Interval) -> usize {
        self.trend_calls.lock().unwrap().get(&interval).copied().unwrap_or(0)
    }
}

#[async_trait]
impl MetricsSource for MockSource {
    async fn get_order_metrics(&self) -> anyhow::Result<MetricsSnapshot> {
        self.metrics_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.metrics_gate {
            gate.notified().await;
        }
        self.metrics.clone().ok_or_else(|| anyhow::anyhow!("metrics endpoint returned 500"))
    }

    async fn get_realtime_stats(&self) -> anyhow::Result<RealtimeSnapshot> {
        self.realtime_calls.fetch_add(1, Ordering::SeqCst);
        self.realtime.clone().ok_or_else(|| anyhow::anyhow!("realtime endpoint returned 500"))
    }

    async fn get_trends(&self, interval: Interval, _bucket_count: u32) -> anyhow::Result<TrendPayload> {
        *self.trend_calls.lock().unwrap().entry(interval).or_insert(0) += 1;
        let gate = self.gates.lock().unwrap().get(&interval).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.failing_trends.lock().unwrap().contains(&interval) {
            anyhow::bail!("trends endpoint returned 503");
        }
        self.trends
            .get(&interval)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no trends for {}", interval))
    }

    async fn get_revenue_total(&self) -> anyhow::Result<RevenueTotal> {
        self.fallback_calls.fetch_add(1, Ordering::SeqCst);
        self.revenue_total
            .map(|total_revenue| RevenueTotal { total_revenue })
            .ok_or_else(|| anyhow::anyhow!("revenue endpoint unreachable"))
    }

    async fn get_orders_page(&self, _offset: u64, _limit: u64) -> anyhow::Result<OrdersPage> {
        self.fallback_calls.fetch_add(1, Ordering::SeqCst);
        self.order_count
            .map(|total_elements| OrdersPage { total_elements })
            .ok_or_else(|| anyhow::anyhow!("orders endpoint unreachable"))
    }
}

/// Scripted `PushFeed`. Messages pushed through `send` reach the open stream.
#[derive(Default)]
pub struct MockFeed {
    sender: Mutex<Option<mpsc::UnboundedSender<FeedMessage>>>,
    connect_gate: Option<Arc<Notify>>,
    fail_connect: bool,
    pub connects: AtomicUsize,
    pub disconnects: AtomicUsize,
}

impl MockFeed {
    pub fn failing() -> Self {
        Self {
            fail_connect: true,
            ..Default::default()
        }
    }

    /// Blocks `connect` until the returned gate is notified.
    pub fn gated() -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let feed = Self {
            connect_gate: Some(gate.clone()),
            ..Default::default()
        };
        (feed, gate)
    }

    pub fn send(&self, message: FeedMessage) {
        if let Some(tx) = self.sender.lock().unwrap().as_ref() {
            let _ = tx.unbounded_send(message);
        }
    }

    /// Ends the open stream as a server-side close would.
    pub fn end_stream(&self) {
        self.sender.lock().unwrap().take();
    }

    pub fn disconnect_count(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PushFeed for MockFeed {
    async fn connect(&self) -> anyhow::Result<FeedStream> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.connect_gate {
            gate.notified().await;
        }
        if self.fail_connect {
            anyhow::bail!("connection refused");
        }
        let (tx, rx) = mpsc::unbounded();
        *self.sender.lock().unwrap() = Some(tx);
        Ok(rx.boxed())
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        self.sender.lock().unwrap().take();
    }
}
