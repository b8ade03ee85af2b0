//! Server push channel of a run
//!
//! A [`PushChannel`] owns one spawned task that decodes the SSE body of a run and forwards
//! classified messages. [`ChannelSlot`] holds at most one of them and always tears the previous
//! channel down before another is installed.
use crate::sse::SseDecoder;
use futures_util::{Stream, StreamExt};
use meshperf_core::StreamEvent;
use std::fmt::Display;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn, Instrument};

const CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    Event(StreamEvent),
    /// The body stream failed.
    TransportError(String),
    /// The body ended.
    Closed,
}

#[derive(Debug)]
pub struct PushChannel {
    rx: mpsc::Receiver<ChannelMessage>,
    task: Option<JoinHandle<()>>,
}

impl PushChannel {
    /// Spawn the decoding task over a response body.
    pub fn open<S, B, E>(body: S) -> Self
    where
        S: Stream<Item = Result<B, E>> + Send + 'static,
        B: AsRef<[u8]> + Send + 'static,
        E: Display + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        let task = tokio::spawn(pump(body, tx).in_current_span());
        Self {
            rx,
            task: Some(task),
        }
    }

    /// Next message, or `None` once the task is gone and everything was received.
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        self.rx.recv().await
    }

    /// Stop the task and wait until it is torn down, dropping the underlying connection.
    pub async fn close(mut self) {
        self.rx.close();
        if let Some(task) = self.task.take() {
            task.abort();
            if let Err(err) = task.await {
                if !err.is_cancelled() {
                    warn!("Push channel task failed: {err}");
                }
            }
        }
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }
}

async fn pump<S, B, E>(body: S, tx: mpsc::Sender<ChannelMessage>)
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: Display,
{
    let mut body = std::pin::pin!(body);
    let mut decoder = SseDecoder::new();

    while let Some(chunk) = body.next().await {
        let chunk = match chunk {
            Ok(chunk) => chunk,
            Err(err) => {
                let _ = tx.send(ChannelMessage::TransportError(err.to_string())).await;
                return;
            }
        };

        for frame in decoder.push(chunk.as_ref()) {
            match serde_json::from_str::<StreamEvent>(&frame.data) {
                Ok(event) => {
                    trace!("Received {} event", event.status());
                    if tx.send(ChannelMessage::Event(event)).await.is_err() {
                        return;
                    }
                }
                Err(err) => warn!("Skipping undecodable event `{}`: {err}", frame.data),
            }
        }
    }

    if decoder.has_pending() {
        debug!("Discarding incomplete frame at end of stream");
    }
    let _ = tx.send(ChannelMessage::Closed).await;
}

/// Holder of the single live push channel.
#[derive(Debug, Default)]
pub struct ChannelSlot {
    current: Option<PushChannel>,
}

impl ChannelSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    pub async fn close(&mut self) {
        if let Some(channel) = self.current.take() {
            debug!("Closing push channel");
            channel.close().await;
            #[cfg(feature = "metrics")]
            metrics::gauge!("meshperf.channel.open").set(0.0);
        }
    }

    /// Install a new channel. Any channel still held is closed first.
    pub async fn replace(&mut self, channel: PushChannel) {
        self.close().await;
        self.current = Some(channel);
        #[cfg(feature = "metrics")]
        metrics::gauge!("meshperf.channel.open").set(1.0);
    }

    /// Next message of the held channel; `None` when no channel is held or it has drained.
    pub async fn recv(&mut self) -> Option<ChannelMessage> {
        match &mut self.current {
            Some(channel) => channel.recv().await,
            None => None,
        }
    }
}
