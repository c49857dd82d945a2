// Realtime subscription - owns the single push-feed connection of a dashboard
use crate::application::push_feed::{FeedMessage, PushFeed};
use crate::domain::metrics::RealtimeSnapshot;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

const FEED_SOURCE: &str = "realtime feed";

/// Connection lifecycle.
///
/// `Idle -> Connecting -> Open -> Closed`; `Connecting -> Closed` when torn down
/// before the connection completes. Feed errors leave the state unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionState {
    Idle,
    Connecting,
    Open,
    Closed,
}

/// Receiver of subscription events, one handler per event type.
#[async_trait]
pub trait RealtimeListener: Send + Sync {
    /// A full replacement snapshot arrived.
    async fn updated(&self, snapshot: RealtimeSnapshot);

    /// The feed reported an error. The previous snapshot stays current.
    async fn errored(&self, error: DashboardError);
}

pub struct RealtimeSubscriptionManager {
    feed: Arc<dyn PushFeed>,
    state: Arc<Mutex<SubscriptionState>>,
    task: Mutex<Option<JoinHandle<()>>>,
    order_window: usize,
}

impl RealtimeSubscriptionManager {
    pub fn new(feed: Arc<dyn PushFeed>, order_window: usize) -> Self {
        Self {
            feed,
            state: Arc::new(Mutex::new(SubscriptionState::Idle)),
            task: Mutex::new(None),
            order_window,
        }
    }

    pub async fn state(&self) -> SubscriptionState {
        *self.state.lock().await
    }

    /// Starts the connection and routes its messages to `listener`.
    ///
    /// Opening an already live subscription is ignored; opening a closed one fails.
    pub async fn open(&self, listener: Arc<dyn RealtimeListener>) -> Result<()> {
        let mut state = self.state.lock().await;
        match *state {
            SubscriptionState::Idle => {}
            SubscriptionState::Closed => return Err(DashboardError::SubscriptionClosed),
            SubscriptionState::Connecting | SubscriptionState::Open => {
                tracing::warn!("Realtime subscription already {:?}, ignoring open", *state);
                return Ok(());
            }
        }
        *state = SubscriptionState::Connecting;

        let handle = tokio::spawn(run_feed(
            self.feed.clone(),
            self.state.clone(),
            listener,
            self.order_window,
        ));
        *self.task.lock().await = Some(handle);
        Ok(())
    }

    /// Releases the connection. Idempotent; only the first call on a started
    /// subscription disconnects.
    pub async fn close(&self) {
        let previous = {
            let mut state = self.state.lock().await;
            std::mem::replace(&mut *state, SubscriptionState::Closed)
        };

        match previous {
            SubscriptionState::Closed => {
                tracing::debug!("Realtime subscription already closed");
                return;
            }
            SubscriptionState::Idle => {
                tracing::debug!("Realtime subscription closed before it was opened");
                return;
            }
            SubscriptionState::Connecting | SubscriptionState::Open => {}
        }

        // Disconnect while the reader is still alive so the feed can close cleanly.
        self.feed.disconnect().await;
        if let Some(task) = self.task.lock().await.take() {
            task.abort();
        }
        tracing::info!("Realtime subscription closed (was {:?})", previous);
    }
}

impl Drop for RealtimeSubscriptionManager {
    fn drop(&mut self) {
        if let Some(task) = self.task.get_mut().take() {
            task.abort();
        }
    }
}

async fn run_feed(
    feed: Arc<dyn PushFeed>,
    state: Arc<Mutex<SubscriptionState>>,
    listener: Arc<dyn RealtimeListener>,
    order_window: usize,
) {
    let mut stream = match feed.connect().await {
        Ok(stream) => stream,
        Err(e) => {
            tracing::warn!("Realtime feed connection failed: {:#}", e);
            listener.errored(DashboardError::unavailable(FEED_SOURCE, &e)).await;
            return;
        }
    };

    {
        let mut state = state.lock().await;
        if *state == SubscriptionState::Closed {
            return;
        }
        *state = SubscriptionState::Open;
    }
    tracing::info!("Realtime feed connected");

    while let Some(message) = stream.next().await {
        match message {
            FeedMessage::Snapshot(snapshot) => {
                listener.updated(snapshot.with_order_window(order_window)).await;
            }
            FeedMessage::Error(message) => {
                tracing::warn!("Realtime feed error: {}", message);
                listener
                    .errored(DashboardError::SourceUnavailable {
                        source_name: FEED_SOURCE,
                        message,
                    })
                    .await;
            }
        }
    }

    if *state.lock().await == SubscriptionState::Closed {
        return;
    }
    tracing::warn!("Realtime feed ended by server");
    listener
        .errored(DashboardError::SourceUnavailable {
            source_name: FEED_SOURCE,
            message: "feed ended by server".to_string(),
        })
        .await;
}
