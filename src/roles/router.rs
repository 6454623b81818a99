// src/roles/router.rs

use super::{close_socket, open_socket, Role};
use crate::config::{RouterConfig, SocketMode};
use crate::error::Result;
use crate::message::{lossy, recv_frames, RoutedCommand};
use crate::peers::PeerRegistry;
use crate::state::MessageState;
use crate::supervisor::supervise;
use async_trait::async_trait;
use rzmq::{Context, Socket, SocketType};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Listens for dealer commands and toggles the shared [`MessageState`] on each one.
///
/// There is a single state, LISTENING: every well-formed `[identity, payload]`
/// message toggles the language whatever the payload or sender. A message
/// with any other frame count ends the loop with a decode error.
pub struct Router {
  config: RouterConfig,
  state: Arc<MessageState>,
  peers: Arc<PeerRegistry>,
}

impl Router {
  pub fn new(config: RouterConfig, state: Arc<MessageState>) -> Result<Self> {
    config.validate()?;
    let peers = Arc::new(PeerRegistry::with_capacity(config.max_peers));
    Ok(Self { config, state, peers })
  }

  pub fn peers(&self) -> Arc<PeerRegistry> {
    self.peers.clone()
  }

  async fn run_once(&self, ctx: &Context, token: &CancellationToken) -> Result<()> {
    let url = self.config.endpoint.url();
    tracing::info!(endpoint = %url, "Binding command ROUTER");
    let socket = open_socket(ctx, SocketType::Router, &self.config.endpoint, SocketMode::Bind, &[]).await?;
    tracing::info!(endpoint = %url, "Command ROUTER initialized");
    let result = self.listen(&socket, token).await;
    close_socket(socket, self.name()).await;
    result
  }

  async fn listen(&self, socket: &Socket, token: &CancellationToken) -> Result<()> {
    loop {
      let frames = tokio::select! {
        _ = token.cancelled() => return Ok(()),
        frames = recv_frames(socket) => frames?,
      };
      let command = RoutedCommand::from_frames(frames)?;
      tracing::info!(
        sender_id = %lossy(&command.identity),
        message = %lossy(&command.payload),
        "Command ROUTER received command"
      );

      let snapshot = self.state.toggle();
      let peer = self.peers.record(&command.identity);
      tracing::info!(
        language = %snapshot.language,
        toggles = snapshot.toggles,
        peer_commands = peer.commands,
        "Changed language! New language is: {}",
        snapshot.language
      );
    }
  }
}

#[async_trait]
impl Role for Router {
  fn name(&self) -> &'static str {
    "router"
  }

  async fn run(&self, ctx: &Context, token: &CancellationToken) -> Result<()> {
    supervise(self.name(), token, self.config.retry, || self.run_once(ctx, token)).await
  }
}
