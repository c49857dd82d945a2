// Dashboard service - Reconciles batch, realtime and trend sources into one view
use crate::application::metrics_source::MetricsSource;
use crate::application::push_feed::PushFeed;
use crate::application::realtime_subscription::{RealtimeListener, RealtimeSubscriptionManager};
use crate::application::trend_cache::TrendCacheManager;
use crate::domain::metrics::{MetricsSnapshot, RealtimeSnapshot};
use crate::domain::trend::{Axis, Interval, TrendSeries};
use crate::domain::view::{
    project_status_breakdown, project_trend, ProjectedTrend, StatusBreakdown,
};
use crate::error::{DashboardError, Result};
use crate::infrastructure::config::DisplaySettings;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct AxisState {
    /// Most recently requested interval.
    selected: Interval,
    /// Series currently displayed; only replaced by a successful, current fetch.
    series: Option<Arc<TrendSeries>>,
    /// Sequence number of the latest switch issued for this axis.
    latest_sequence: u64,
}

impl AxisState {
    fn new(interval: Interval) -> Self {
        Self {
            selected: interval,
            series: None,
            latest_sequence: 0,
        }
    }

    fn project(&self, axis: Axis) -> ProjectedTrend {
        match &self.series {
            Some(series) => project_trend(series, axis),
            None => ProjectedTrend::empty(axis, self.selected),
        }
    }
}

#[derive(Debug)]
struct SessionState {
    loading: bool,
    initialized: bool,
    metrics: Option<Arc<MetricsSnapshot>>,
    realtime: Option<Arc<RealtimeSnapshot>>,
    realtime_pushed: bool,
    realtime_error: Option<String>,
    revenue: AxisState,
    orders: AxisState,
    last_updated: Option<DateTime<Utc>>,
}

impl SessionState {
    fn new(default_interval: Interval) -> Self {
        Self {
            loading: true,
            initialized: false,
            metrics: None,
            realtime: None,
            realtime_pushed: false,
            realtime_error: None,
            revenue: AxisState::new(default_interval),
            orders: AxisState::new(default_interval),
            last_updated: None,
        }
    }

    fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::Revenue => &self.revenue,
            Axis::Orders => &self.orders,
        }
    }

    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::Revenue => &mut self.revenue,
            Axis::Orders => &mut self.orders,
        }
    }

    fn touch(&mut self) {
        self.last_updated = Some(Utc::now());
    }
}

/// Session state owned by one dashboard instance. Receives realtime pushes directly.
pub struct DashboardState {
    inner: RwLock<SessionState>,
}

impl DashboardState {
    fn new(default_interval: Interval) -> Self {
        Self {
            inner: RwLock::new(SessionState::new(default_interval)),
        }
    }
}

#[async_trait]
impl RealtimeListener for DashboardState {
    async fn updated(&self, snapshot: RealtimeSnapshot) {
        let mut state = self.inner.write().await;
        state.realtime = Some(Arc::new(snapshot));
        state.realtime_pushed = true;
        state.realtime_error = None;
        state.touch();
    }

    async fn errored(&self, error: DashboardError) {
        self.inner.write().await.realtime_error = Some(error.to_string());
    }
}

/// Formatted monetary figures for the summary cards.
#[derive(Debug, Clone, Serialize)]
pub struct FormattedTotals {
    pub total_revenue: String,
    pub avg_order_value: String,
    pub revenue_per_minute: String,
}

/// Read-only view handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub loading: bool,
    pub metrics: Option<MetricsSnapshot>,
    pub realtime: Option<RealtimeSnapshot>,
    pub realtime_error: Option<String>,
    pub status_breakdown: StatusBreakdown,
    pub revenue_trend: ProjectedTrend,
    pub orders_trend: ProjectedTrend,
    pub totals: FormattedTotals,
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchOutcome {
    /// The interval was already active; nothing was fetched.
    Unchanged,
    /// The new series is displayed.
    Applied,
    /// A newer switch on the same axis was issued while this one was in flight.
    Superseded,
}

pub struct MetricsDashboard {
    source: Arc<dyn MetricsSource>,
    trend_cache: Arc<TrendCacheManager>,
    subscription: RealtimeSubscriptionManager,
    state: Arc<DashboardState>,
    display: DisplaySettings,
}

impl MetricsDashboard {
    pub fn new(source: Arc<dyn MetricsSource>, feed: Arc<dyn PushFeed>, display: DisplaySettings) -> Self {
        Self {
            trend_cache: Arc::new(TrendCacheManager::new(source.clone())),
            subscription: RealtimeSubscriptionManager::new(feed, display.recent_orders_window),
            state: Arc::new(DashboardState::new(display.default_interval)),
            source,
            display,
        }
    }

    /// Opens the realtime subscription and loads batch metrics, the realtime
    /// snapshot and the default trend concurrently. Each source fails on its
    /// own; loading clears once all three have settled.
    pub async fn initialize(&self) {
        {
            let mut state = self.state.inner.write().await;
            if state.initialized {
                tracing::warn!("Dashboard already initialized");
                return;
            }
            state.initialized = true;
        }

        let listener: Arc<dyn RealtimeListener> = self.state.clone();
        if let Err(e) = self.subscription.open(listener).await {
            tracing::warn!("Could not open realtime subscription: {}", e);
        }

        let default_interval = self.display.default_interval;
        tokio::join!(
            self.load_metrics(),
            self.load_realtime(),
            self.load_default_trend(default_interval),
        );

        let mut state = self.state.inner.write().await;
        state.loading = false;
        state.touch();
        tracing::info!(
            "Initial load settled (metrics: {}, realtime: {}, trend: {})",
            state.metrics.is_some(),
            state.realtime.is_some(),
            state.axis(Axis::Revenue).series.is_some(),
        );
    }

    async fn load_metrics(&self) {
        match self.fetch_metrics().await {
            Ok(metrics) => {
                let mut state = self.state.inner.write().await;
                state.metrics = Some(Arc::new(metrics));
                state.touch();
            }
            Err(e) => tracing::error!("{}", e),
        }
    }

    // The fallback decision only sees the settled primary outcome.
    async fn fetch_metrics(&self) -> Result<MetricsSnapshot> {
        match self.source.get_order_metrics().await {
            Ok(metrics) => Ok(metrics),
            Err(e) => {
                tracing::warn!("{}; computing fallback", DashboardError::unavailable("order metrics", &e));
                self.fallback_metrics().await
            }
        }
    }

    async fn fallback_metrics(&self) -> Result<MetricsSnapshot> {
        let (revenue, page) = tokio::join!(
            self.source.get_revenue_total(),
            self.source.get_orders_page(0, 1),
        );

        match (revenue, page) {
            (Ok(revenue), Ok(page)) => {
                tracing::info!(
                    "Computed fallback metrics from {} orders totalling {}",
                    page.total_elements,
                    revenue.total_revenue
                );
                Ok(MetricsSnapshot::from_totals(revenue.total_revenue, page.total_elements))
            }
            (revenue, page) => {
                if let Err(e) = revenue {
                    tracing::warn!("{}", DashboardError::unavailable("revenue total", &e));
                }
                if let Err(e) = page {
                    tracing::warn!("{}", DashboardError::unavailable("orders page", &e));
                }
                Err(DashboardError::FallbackExhausted)
            }
        }
    }

    async fn load_realtime(&self) {
        match self.source.get_realtime_stats().await {
            Ok(snapshot) => {
                let mut state = self.state.inner.write().await;
                if state.realtime_pushed {
                    tracing::debug!("Realtime push arrived first, dropping initial snapshot");
                    return;
                }
                let snapshot = snapshot.with_order_window(self.display.recent_orders_window);
                state.realtime = Some(Arc::new(snapshot));
                state.touch();
            }
            Err(e) => tracing::warn!("{}", DashboardError::unavailable("realtime stats", &e)),
        }
    }

    async fn load_default_trend(&self, interval: Interval) {
        // Failures are logged by the cache.
        let Ok(series) = self
            .trend_cache
            .get_or_fetch(interval, interval.default_bucket_count())
            .await
        else {
            return;
        };

        let mut state = self.state.inner.write().await;
        for axis in Axis::ALL {
            let axis_state = state.axis_mut(axis);
            // An explicit switch issued during the initial load takes precedence,
            // unless it has left the axis with nothing to show.
            if axis_state.latest_sequence == 0 || axis_state.series.is_none() {
                axis_state.series = Some(series.clone());
            }
        }
        state.touch();
    }

    /// Shows `interval` on `axis`.
    ///
    /// A failed fetch leaves the displayed series untouched and is returned to
    /// the caller. Responses overtaken by a newer switch on the same axis are
    /// dropped.
    pub async fn switch_interval(&self, axis: Axis, interval: Interval) -> Result<SwitchOutcome> {
        let sequence = {
            let mut state = self.state.inner.write().await;
            let axis_state = state.axis_mut(axis);
            let displayed = axis_state.series.as_ref().map(|s| s.interval);
            if axis_state.selected == interval && displayed == Some(interval) {
                tracing::debug!("{} axis already showing {}", axis, interval);
                return Ok(SwitchOutcome::Unchanged);
            }
            axis_state.selected = interval;
            axis_state.latest_sequence += 1;
            axis_state.latest_sequence
        };

        let fetched = self
            .trend_cache
            .get_or_fetch(interval, interval.default_bucket_count())
            .await;

        let mut state = self.state.inner.write().await;
        let axis_state = state.axis_mut(axis);
        if axis_state.latest_sequence != sequence {
            tracing::debug!("Discarding {}", DashboardError::StaleResponse { axis, sequence });
            return Ok(SwitchOutcome::Superseded);
        }

        match fetched {
            Ok(series) => {
                axis_state.series = Some(series);
                state.touch();
                Ok(SwitchOutcome::Applied)
            }
            Err(e) => {
                if let Some(series) = &axis_state.series {
                    axis_state.selected = series.interval;
                }
                Err(e)
            }
        }
    }

    pub async fn view(&self) -> DashboardView {
        let state = self.state.inner.read().await;
        let currency = &self.display.currency;
        let metrics = state.metrics.as_deref();
        let realtime = state.realtime.as_deref();

        DashboardView {
            loading: state.loading,
            metrics: metrics.cloned(),
            realtime: realtime.cloned(),
            realtime_error: state.realtime_error.clone(),
            status_breakdown: metrics.map(project_status_breakdown).unwrap_or_default(),
            revenue_trend: state.axis(Axis::Revenue).project(Axis::Revenue),
            orders_trend: state.axis(Axis::Orders).project(Axis::Orders),
            totals: FormattedTotals {
                total_revenue: currency.format(metrics.map(|m| m.total_revenue)),
                avg_order_value: currency.format(metrics.map(|m| m.avg_order_value)),
                revenue_per_minute: currency.format(realtime.map(|r| r.revenue_per_minute)),
            },
            last_updated: state.last_updated.map(|t| t.to_rfc3339()),
        }
    }

    /// Tears the dashboard down. Safe to call more than once.
    pub async fn shutdown(&self) {
        self.subscription.close().await;
    }
}
