// Websocket push feed for realtime statistics
use crate::application::push_feed::{FeedMessage, FeedStream, PushFeed};
use crate::domain::metrics::RealtimeSnapshot;
use anyhow::Context;
use async_trait::async_trait;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{watch, Mutex};
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

type FeedSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// Connects to the analytics service's `/ws/realtime` endpoint. Each text
/// frame carries one full realtime snapshot.
pub struct WebSocketFeed {
    url: String,
    shutdown: watch::Sender<bool>,
    sink: Mutex<Option<FeedSink>>,
}

impl WebSocketFeed {
    pub fn new(url: impl Into<String>) -> Self {
        let (shutdown, _) = watch::channel(false);
        Self {
            url: url.into(),
            shutdown,
            sink: Mutex::new(None),
        }
    }
}

#[async_trait]
impl PushFeed for WebSocketFeed {
    async fn connect(&self) -> anyhow::Result<FeedStream> {
        let (socket, _) = connect_async(self.url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", self.url))?;
        tracing::info!("Connected to realtime feed at {}", self.url);

        let (write, mut read) = socket.split();
        *self.sink.lock().await = Some(write);
        let mut shutdown = self.shutdown.subscribe();

        let stream = async_stream::stream! {
            loop {
                if *shutdown.borrow() {
                    break;
                }
                let frame = tokio::select! {
                    _ = shutdown.changed() => None,
                    frame = read.next() => frame,
                };
                match frame {
                    Some(Ok(Message::Text(text))) => yield decode_frame(&text),
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        // Read errors from tungstenite are terminal for the socket.
                        yield FeedMessage::Error(format!("websocket error: {}", e));
                        break;
                    }
                }
            }
        };
        Ok(stream.boxed())
    }

    async fn disconnect(&self) {
        // Latches even when no reader is subscribed.
        self.shutdown.send_replace(true);

        let Some(mut sink) = self.sink.lock().await.take() else {
            tracing::debug!("Disconnect requested for {} with no open socket", self.url);
            return;
        };
        match sink.close().await {
            Ok(()) => tracing::debug!("Sent close frame to {}", self.url),
            Err(e) => tracing::debug!("Closing {} failed: {}", self.url, e),
        }
    }
}

fn decode_frame(text: &str) -> FeedMessage {
    match serde_json::from_str::<RealtimeSnapshot>(text) {
        Ok(snapshot) => FeedMessage::Snapshot(snapshot),
        Err(e) => FeedMessage::Error(format!("malformed realtime frame: {}", e)),
    }
}
