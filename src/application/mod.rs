// Application layer - Use cases over the metrics sources
pub mod dashboard_service;
pub mod metrics_source;
pub mod push_feed;
pub mod realtime_subscription;
pub mod trend_cache;

#[cfg(test)]
pub mod testing;
