// Trend cache - at most one fetch per interval per session
use crate::application::metrics_source::MetricsSource;
use crate::domain::trend::{Interval, TrendSeries};
use crate::error::{DashboardError, Result};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

type PendingFetch = Shared<BoxFuture<'static, Result<Arc<TrendSeries>>>>;

/// Memoizes trend series by interval. The only writer of cached entries.
pub struct TrendCacheManager {
    source: Arc<dyn MetricsSource>,
    entries: RwLock<HashMap<Interval, Arc<TrendSeries>>>,
    pending: Mutex<HashMap<Interval, PendingFetch>>,
}

impl TrendCacheManager {
    pub fn new(source: Arc<dyn MetricsSource>) -> Self {
        Self {
            source,
            entries: RwLock::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub async fn cached(&self, interval: Interval) -> Option<Arc<TrendSeries>> {
        self.entries.read().await.get(&interval).cloned()
    }

    /// Returns the cached series for `interval`, fetching it on a miss.
    ///
    /// Concurrent misses for the same interval share one in-flight request.
    /// A failed fetch leaves the entry absent.
    pub async fn get_or_fetch(&self, interval: Interval, bucket_count: u32) -> Result<Arc<TrendSeries>> {
        if let Some(series) = self.cached(interval).await {
            tracing::debug!("Trend cache hit for {}", interval);
            return Ok(series);
        }

        let fetch = {
            let mut pending = self.pending.lock().await;
            // Re-check under the pending lock: a fetch may have landed meanwhile.
            if let Some(series) = self.cached(interval).await {
                return Ok(series);
            }
            pending
                .entry(interval)
                .or_insert_with(|| {
                    tracing::debug!("Trend cache miss for {}, fetching {} buckets", interval, bucket_count);
                    let source = self.source.clone();
                    async move {
                        source
                            .get_trends(interval, bucket_count)
                            .await
                            .map(|payload| Arc::new(payload.into_series(interval)))
                            .map_err(|e| DashboardError::unavailable("trends", &e))
                    }
                    .boxed()
                    .shared()
                })
                .clone()
        };

        let outcome = fetch.clone().await;

        // Store before releasing the pending slot so no caller sees neither.
        let mut pending = self.pending.lock().await;
        let outcome = match outcome {
            Ok(series) => Ok(self.store(series).await),
            Err(e) => Err(e),
        };
        if pending.get(&interval).is_some_and(|p| p.ptr_eq(&fetch)) {
            pending.remove(&interval);
            if let Err(e) = &outcome {
                tracing::warn!("Failed to fetch {} trends: {}", interval, e);
            }
        }
        outcome
    }

    /// Drops the entry for `interval` so the next request fetches again.
    pub async fn invalidate(&self, interval: Interval) {
        if self.entries.write().await.remove(&interval).is_some() {
            tracing::debug!("Invalidated {} trend cache entry", interval);
        }
    }

    // Keyed by the interval the payload reported, which may differ from the
    // request. An existing entry stays authoritative and is returned instead.
    async fn store(&self, series: Arc<TrendSeries>) -> Arc<TrendSeries> {
        let mut entries = self.entries.write().await;
        let stored = entries.entry(series.interval).or_insert_with(|| series.clone());
        if !Arc::ptr_eq(stored, &series) {
            tracing::debug!("Keeping cached {} trends over a later response", series.interval);
        }
        stored.clone()
    }
}
