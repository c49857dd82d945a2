// Push connection trait for the realtime feed
use crate::domain::metrics::RealtimeSnapshot;
use async_trait::async_trait;
use futures::stream::BoxStream;

/// One inbound item from the push connection.
#[derive(Debug, Clone)]
pub enum FeedMessage {
    Snapshot(RealtimeSnapshot),
    /// Connection-level error that did not close the connection.
    Error(String),
}

pub type FeedStream = BoxStream<'static, FeedMessage>;

#[async_trait]
pub trait PushFeed: Send + Sync {
    /// Establish the connection. The returned stream ends when the server closes it.
    async fn connect(&self) -> anyhow::Result<FeedStream>;

    /// Release the connection.
    async fn disconnect(&self);
}
