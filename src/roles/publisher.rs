// src/roles/publisher.rs

use super::{close_socket, open_socket, Role};
use crate::config::PublisherConfig;
use crate::error::Result;
use crate::message::{send_frames, TopicMessage};
use crate::state::{MessageState, Snapshot};
use crate::supervisor::{pause, supervise};
use async_trait::async_trait;
use bytes::Bytes;
use rzmq::{Context, Socket, SocketType};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Broadcasts the current [`MessageState`] payload on a topic at a fixed interval.
pub struct Publisher {
  config: PublisherConfig,
  state: Arc<MessageState>,
  tap: Option<async_channel::Sender<Snapshot>>,
}

impl Publisher {
  pub fn new(config: PublisherConfig, state: Arc<MessageState>) -> Result<Self> {
    config.validate()?;
    Ok(Self {
      config,
      state,
      tap: None,
    })
  }

  /// Observer hook: every snapshot is also sent to `tap` once it has been
  /// handed to the transport. A tap that stops draining holds up the
  /// publish loop but never shutdown; dropping the receiver detaches it.
  pub fn with_tap(mut self, tap: async_channel::Sender<Snapshot>) -> Self {
    self.tap = Some(tap);
    self
  }

  async fn run_once(&self, ctx: &Context, token: &CancellationToken) -> Result<()> {
    let url = self.config.endpoint.url();
    tracing::info!(endpoint = %url, mode = ?self.config.mode, "Setting up PUBLISHER");
    let socket = open_socket(ctx, SocketType::Pub, &self.config.endpoint, self.config.mode, &[]).await?;
    let result = self.publish_loop(&socket, token).await;
    close_socket(socket, self.name()).await;
    result
  }

  async fn publish_loop(&self, socket: &Socket, token: &CancellationToken) -> Result<()> {
    tracing::debug!(grace = ?self.config.grace_period, "PUBLISHER waiting for subscribers to settle");
    if !pause(token, self.config.grace_period).await {
      return Ok(());
    }

    let topic = Bytes::from(self.config.topic.clone());
    loop {
      let snapshot = self.state.snapshot();
      tracing::info!(topic = %self.config.topic, language = %snapshot.language, "PUB: {}", snapshot.payload);

      let frames = TopicMessage::new(topic.clone(), snapshot.payload.clone()).into_frames();
      tokio::select! {
        _ = token.cancelled() => return Ok(()),
        sent = send_frames(socket, frames) => sent?,
      }
      if let Some(tap) = &self.tap {
        tokio::select! {
          _ = token.cancelled() => return Ok(()),
          // A dropped receiver just means nobody is watching any more.
          _ = tap.send(snapshot) => {}
        }
      }

      if !pause(token, self.config.interval).await {
        return Ok(());
      }
    }
  }
}

#[async_trait]
impl Role for Publisher {
  fn name(&self) -> &'static str {
    "publisher"
  }

  async fn run(&self, ctx: &Context, token: &CancellationToken) -> Result<()> {
    supervise(self.name(), token, self.config.retry, || self.run_once(ctx, token)).await
  }
}
