// src/roles/subscriber.rs

use super::{close_socket, open_socket, Role};
use crate::config::SubscriberConfig;
use crate::error::Result;
use crate::message::{lossy, recv_frames, TopicMessage};
use crate::supervisor::supervise;
use async_trait::async_trait;
use rzmq::socket::options::SUBSCRIBE;
use rzmq::{Context, Socket, SocketType};
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Processing step for messages that passed the subscription filter.
#[async_trait]
pub trait MessageHandler: Send + Sync + 'static {
  /// Returning `Break` stops the subscriber cleanly.
  async fn handle(&self, msg: TopicMessage) -> ControlFlow<()>;
}

/// Logs each received payload.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogHandler;

#[async_trait]
impl MessageHandler for LogHandler {
  async fn handle(&self, msg: TopicMessage) -> ControlFlow<()> {
    tracing::info!(topic = %lossy(&msg.topic), "message received: {}", lossy(&msg.payload));
    ControlFlow::Continue(())
  }
}

/// Forwards each message into a channel; stops once the receiver is dropped.
#[derive(Debug, Clone)]
pub struct ChannelHandler {
  tx: async_channel::Sender<TopicMessage>,
}

impl ChannelHandler {
  pub fn new(tx: async_channel::Sender<TopicMessage>) -> Self {
    Self { tx }
  }

  /// Convenience constructor returning the handler and an unbounded receiver.
  pub fn unbounded() -> (Self, async_channel::Receiver<TopicMessage>) {
    let (tx, rx) = async_channel::unbounded();
    (Self { tx }, rx)
  }
}

#[async_trait]
impl MessageHandler for ChannelHandler {
  async fn handle(&self, msg: TopicMessage) -> ControlFlow<()> {
    match self.tx.send(msg).await {
      Ok(()) => ControlFlow::Continue(()),
      Err(_) => {
        tracing::debug!("SUBSCRIBER channel receiver dropped; stopping");
        ControlFlow::Break(())
      }
    }
  }
}

/// Receives `[topic, payload]` messages for one topic prefix and hands them
/// to a [`MessageHandler`].
///
/// Prefix filtering happens in the transport, so the topic is not checked
/// again here. Payloads must be UTF-8.
pub struct Subscriber {
  config: SubscriberConfig,
  handler: Arc<dyn MessageHandler>,
  ready: Option<async_channel::Sender<()>>,
}

impl Subscriber {
  pub fn new(config: SubscriberConfig, handler: Arc<dyn MessageHandler>) -> Result<Self> {
    config.validate()?;
    Ok(Self {
      config,
      handler,
      ready: None,
    })
  }

  /// Observer hook: notified each time the socket is subscribed and
  /// attached, before the first receive.
  pub fn with_ready(mut self, ready: async_channel::Sender<()>) -> Self {
    self.ready = Some(ready);
    self
  }

  /// A subscriber that logs every payload.
  pub fn logging(config: SubscriberConfig) -> Result<Self> {
    Self::new(config, Arc::new(LogHandler))
  }

  async fn run_once(&self, ctx: &Context, token: &CancellationToken) -> Result<()> {
    let url = self.config.endpoint.url();
    tracing::info!(endpoint = %url, mode = ?self.config.mode, "Setting up SUBSCRIBER");
    let options = [(SUBSCRIBE, self.config.topic.as_bytes())];
    let socket = open_socket(ctx, SocketType::Sub, &self.config.endpoint, self.config.mode, &options).await?;
    tracing::info!(topic = %self.config.topic, "SUBSCRIBER initialized");
    if let Some(ready) = &self.ready {
      let _ = ready.try_send(());
    }
    let result = self.receive_loop(&socket, token).await;
    close_socket(socket, self.name()).await;
    result
  }

  async fn receive_loop(&self, socket: &Socket, token: &CancellationToken) -> Result<()> {
    loop {
      let frames = tokio::select! {
        _ = token.cancelled() => return Ok(()),
        frames = recv_frames(socket) => frames?,
      };
      let msg = TopicMessage::from_frames(frames)?;
      msg.payload_str()?;
      tracing::debug!(topic = %lossy(&msg.topic), payload = %lossy(&msg.payload), "SUBSCRIBER received");
      let flow = tokio::select! {
        _ = token.cancelled() => return Ok(()),
        flow = self.handler.handle(msg) => flow,
      };
      if flow.is_break() {
        return Ok(());
      }
    }
  }
}

#[async_trait]
impl Role for Subscriber {
  fn name(&self) -> &'static str {
    "subscriber"
  }

  async fn run(&self, ctx: &Context, token: &CancellationToken) -> Result<()> {
    supervise(self.name(), token, self.config.retry, || self.run_once(ctx, token)).await
  }
}
